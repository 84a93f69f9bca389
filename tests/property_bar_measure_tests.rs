use plotkit::core::{AxisOrientation, BarSlotRequest, DrawMargin, Scaler, measure_bar_slot};
use proptest::prelude::*;

fn scaler(pixel_width: f64, data_span: f64) -> Scaler {
    Scaler::new(
        DrawMargin::new(0.0, 0.0, pixel_width, 1000.0),
        AxisOrientation::X,
        0.0,
        data_span,
        false,
    )
    .expect("valid scaler")
}

proptest! {
    #[test]
    fn width_respects_floor_and_clamp(
        pixel_width in 10.0f64..4_000.0,
        data_span in 1.0f64..100.0,
        group_padding in 0.0f64..50.0,
        series_padding in 0.0f64..20.0,
        max_bar_width in 1.0f64..200.0,
        count in 1usize..8
    ) {
        let request = BarSlotRequest {
            unit_width: 1.0,
            group_padding,
            series_padding,
            max_bar_width,
            count,
            position: 0,
            ignores_bar_position: false,
        };
        let measure = measure_bar_slot(scaler(pixel_width, data_span), request, 0.0, 0.0, 1000.0)
            .expect("bar measure");

        prop_assert!(measure.unit_width >= 1.0);
        prop_assert!(measure.unit_width <= max_bar_width.max(1.0) + 1e-9);
        prop_assert_eq!(measure.half_unit_width, measure.unit_width / 2.0);
    }

    #[test]
    fn grouped_bars_tile_the_slot_without_overlap(
        count in 2usize..6,
        group_padding in 0.0f64..20.0
    ) {
        let request = |position| BarSlotRequest {
            unit_width: 1.0,
            group_padding,
            series_padding: 0.0,
            max_bar_width: 10_000.0,
            count,
            position,
            ignores_bar_position: false,
        };

        let mut previous_right: Option<f64> = None;
        for position in 0..count {
            let measure =
                measure_bar_slot(scaler(1000.0, 10.0), request(position), 0.0, 0.0, 1000.0)
                    .expect("bar measure");
            let left = measure.center_offset - measure.half_unit_width;
            let right = measure.center_offset + measure.half_unit_width;

            if let Some(previous) = previous_right {
                prop_assert!(left >= previous - 1e-9);
            }
            // Every bar stays inside its category slot.
            prop_assert!(left >= -measure.actual_unit_width / 2.0 - 1e-9);
            prop_assert!(right <= measure.actual_unit_width / 2.0 + 1e-9);
            previous_right = Some(right);
        }
    }

    #[test]
    fn pivot_always_lands_inside_the_clamp_range(
        pivot in -10_000.0f64..10_000.0,
        top in 0.0f64..500.0,
        extent in 1.0f64..1_000.0
    ) {
        let request = BarSlotRequest {
            unit_width: 1.0,
            group_padding: 0.0,
            series_padding: 0.0,
            max_bar_width: 100.0,
            count: 1,
            position: 0,
            ignores_bar_position: false,
        };
        let bottom = top + extent;
        let measure = measure_bar_slot(scaler(1000.0, 10.0), request, pivot, top, bottom)
            .expect("bar measure");

        prop_assert!(measure.pivot_pixel >= top);
        prop_assert!(measure.pivot_pixel <= bottom);
    }
}
