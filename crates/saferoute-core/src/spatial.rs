//! Path sampling and distance helpers.

use crate::models::GeoPoint;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Decimal places kept when fingerprinting samples (~11 m).
pub const FINGERPRINT_DECIMALS: usize = 4;

/// Pick `n` evenly spaced points from `path`, keeping both endpoints.
///
/// Returns the whole path when it has `n` points or fewer. Indices are
/// `round(i * (len - 1) / (n - 1))`, so the same path and `n` always give
/// the same samples.
pub fn sample_path(path: &[GeoPoint], n: usize) -> Vec<GeoPoint> {
    if path.len() <= n {
        return path.to_vec();
    }
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![path[0]];
    }

    let last = path.len() - 1;
    let step = last as f64 / (n - 1) as f64;
    (0..n)
        .map(|i| {
            let idx = ((i as f64) * step).round() as usize;
            path[idx.min(last)]
        })
        .collect()
}

/// Cache key for a sample set: coordinates rounded to 4 decimals.
///
/// Paths that differ by less than the rounding precision share a key.
pub fn fingerprint(samples: &[GeoPoint]) -> String {
    samples
        .iter()
        .map(|p| {
            format!(
                "{:.prec$},{:.prec$}",
                normalize_zero(p.lat),
                normalize_zero(p.lng),
                prec = FINGERPRINT_DECIMALS
            )
        })
        .collect::<Vec<_>>()
        .join(";")
}

// -0.00001 would otherwise print as "-0.0000" and split the cache key.
fn normalize_zero(value: f64) -> f64 {
    let scale = 10f64.powi(FINGERPRINT_DECIMALS as i32);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Calculate distance between two points in meters (Haversine formula).
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lng - a.lng).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Total length of a path in meters.
pub fn path_length_m(path: &[GeoPoint]) -> f64 {
    path.windows(2)
        .map(|pair| haversine_distance(pair[0], pair[1]))
        .sum()
}
