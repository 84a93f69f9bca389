//! Pointer hit testing over measured hover areas.

use ordered_float::OrderedFloat;

use crate::core::point::TooltipFindingStrategy;
use crate::core::series::Series;
use crate::core::types::PixelPoint;

/// One hover/tooltip candidate, addressed by series and entity index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoundPoint {
    pub series_index: usize,
    pub entity_index: usize,
    /// Pixel distance from the pointer to the hover area's center.
    pub distance: f64,
}

/// Finds the points whose hover areas the pointer activates, nearest first.
///
/// `Automatic` resolves per series: columns and candles compare only X, rows
/// only Y, everything else both dimensions. An explicit strategy applies to
/// every series unchanged.
#[must_use]
pub fn find_points_near_to(
    series: &[Series],
    pointer: PixelPoint,
    strategy: TooltipFindingStrategy,
) -> Vec<FoundPoint> {
    let mut found = Vec::new();

    for (series_index, series) in series.iter().enumerate() {
        if !series.visible {
            continue;
        }
        let effective = match strategy {
            TooltipFindingStrategy::Automatic => series.kind.default_hover_strategy(),
            explicit => explicit,
        };

        for point in series.points().values() {
            if !point.hover_area.is_triggered_by(pointer, effective) {
                continue;
            }
            let center = point.hover_area.center();
            let distance = ((center.x - pointer.x).powi(2) + (center.y - pointer.y).powi(2)).sqrt();
            found.push(FoundPoint {
                series_index,
                entity_index: point.entity_index,
                distance,
            });
        }
    }

    found.sort_by_key(|candidate| OrderedFloat(candidate.distance));
    found
}
