//! Distance-fog attenuation table.

/// Visibility floor applied when fog intensity is above zero.
pub const MIN_VISIBILITY: f32 = 0.6;

/// Fog attenuation as a function of integer distance.
///
/// The table is rebuilt lazily whenever the configured max render distance or
/// fog intensity changes. With zero intensity the entries fall linearly from
/// 1.0 toward 0.0; with positive intensity they are floored at
/// [`MIN_VISIBILITY`].
pub struct FogTable {
    values: Vec<f32>,
    max_distance: f32,
    intensity: f32,
}

impl FogTable {
    /// Create an empty (stale) table; the first [`ensure`](Self::ensure)
    /// builds it.
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            max_distance: 0.0,
            intensity: 0.0,
        }
    }

    /// Rebuild the table if the render distance or fog intensity changed.
    pub fn ensure(&mut self, max_distance: f32, intensity: f32) {
        if self.max_distance == max_distance
            && self.intensity == intensity
            && !self.values.is_empty()
        {
            return;
        }
        self.max_distance = max_distance;
        self.intensity = intensity;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let size = (self.max_distance.max(1.0).ceil() as usize).max(1);
        let floor = if self.intensity > 0.0 { MIN_VISIBILITY } else { 0.0 };
        self.values = (0..size)
            .map(|i| (1.0 - i as f32 / size as f32).max(floor))
            .collect();
        log::debug!("rebuilt fog table, {size} entries, floor {floor}");
    }

    /// Attenuation factor at the given distance. Distances past the table's
    /// end clamp to the last entry; an unbuilt table attenuates nothing.
    pub fn factor(&self, distance: f32) -> f32 {
        if self.values.is_empty() {
            return 1.0;
        }
        let i = (distance.max(0.0) as usize).min(self.values.len() - 1);
        self.values[i]
    }

    /// Number of table entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for FogTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_intensity_is_monotone_to_zero() {
        let mut fog = FogTable::new();
        fog.ensure(100.0, 0.0);
        assert_eq!(fog.len(), 100);
        assert_eq!(fog.factor(0.0), 1.0);

        let mut prev = f32::INFINITY;
        for i in 0..fog.len() {
            let f = fog.factor(i as f32);
            assert!(f <= prev, "fog table must be non-increasing at {i}");
            prev = f;
        }
        assert!(fog.factor(99.0) < 0.05);
    }

    #[test]
    fn test_positive_intensity_floors_at_min_visibility() {
        let mut fog = FogTable::new();
        fog.ensure(100.0, 1.0);
        for i in 0..fog.len() {
            assert!(fog.factor(i as f32) >= MIN_VISIBILITY);
        }
        assert_eq!(fog.factor(99.0), MIN_VISIBILITY);
    }

    #[test]
    fn test_rebuild_only_on_change() {
        let mut fog = FogTable::new();
        fog.ensure(100.0, 0.0);
        assert_eq!(fog.len(), 100);
        fog.ensure(100.0, 0.0);
        assert_eq!(fog.len(), 100);
        fog.ensure(250.0, 0.0);
        assert_eq!(fog.len(), 250);
    }

    #[test]
    fn test_out_of_range_clamps() {
        let mut fog = FogTable::new();
        fog.ensure(10.0, 1.0);
        assert_eq!(fog.factor(1e6), MIN_VISIBILITY);
        assert_eq!(fog.factor(-5.0), 1.0);
    }
}
