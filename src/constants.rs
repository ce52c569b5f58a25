// Gravitational and geodetic parameters of Earth, WGS84-consistent.
// Kilometer units throughout: positions in km, velocities in km/s.
// GM is used directly instead of G * M because the product is known to far
// better experimental precision than either factor alone.
pub const GM_EARTH: f64 = 398600.4418; // Standard gravitational parameter (km³/s²)
pub const R_EARTH_EQ: f64 = 6378.137; // Equatorial radius (km)
pub const J2: f64 = 1.08263e-3; // Second zonal harmonic coefficient (dimensionless)

pub const SECONDS_PER_MINUTE: f64 = 60.0;
