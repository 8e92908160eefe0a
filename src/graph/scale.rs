/// Linear mapping from a numeric domain onto a visual range, clamped at both ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
	domain: (f64, f64),
	range: (f64, f64),
}

impl LinearScale {
	pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
		Self { domain, range }
	}

	pub fn apply(&self, value: f64) -> f64 {
		let (d0, d1) = self.domain;
		let (r0, r1) = self.range;
		let span = d1 - d0;
		// degenerate or NaN input maps to the range start
		if span.abs() < f64::EPSILON || value.is_nan() {
			return r0;
		}
		let t = ((value - d0) / span).clamp(0.0, 1.0);
		r0 + (r1 - r0) * t
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn interpolates_inside_the_domain() {
		let scale = LinearScale::new((0.0, 1.0), (15.0, 80.0));
		assert_eq!(scale.apply(0.0), 15.0);
		assert_eq!(scale.apply(0.5), 47.5);
		assert_eq!(scale.apply(1.0), 80.0);
	}

	#[test]
	fn clamps_outside_the_domain() {
		let scale = LinearScale::new((1.0, 10.0), (1.0, 6.0));
		for (outside, boundary) in [(-4.0, 1.0), (0.0, 1.0), (11.0, 10.0), (1e9, 10.0)] {
			assert_eq!(scale.apply(outside), scale.apply(boundary));
		}
	}

	#[test]
	fn degenerate_domain_maps_to_range_start() {
		let scale = LinearScale::new((3.0, 3.0), (2.0, 9.0));
		assert_eq!(scale.apply(3.0), 2.0);
		assert_eq!(scale.apply(f64::NAN), 2.0);
	}
}
