use plotkit::core::{
    BarStyle, CartesianChart, Coordinate, DrawMargin, MeasureSettings, Series, SeriesKind,
};
use plotkit::core::types::ControlSize;
use plotkit::render::{Color, Paint, PaintStyle, VisualKind};

fn settings() -> MeasureSettings {
    MeasureSettings {
        control_size: ControlSize::new(1000.0, 1000.0),
        draw_margin_override: Some(DrawMargin::new(0.0, 0.0, 1000.0, 1000.0)),
        transition: None,
        palette: vec![
            Color::rgb(0.2, 0.4, 0.8),
            Color::rgb(0.8, 0.3, 0.2),
            Color::rgb(0.2, 0.7, 0.3),
        ],
    }
}

fn pinned_axes(chart: &mut CartesianChart, x: (f64, f64), y: (f64, f64)) {
    let mut x_axis = plotkit::core::Axis::new();
    x_axis.min_limit = Some(x.0);
    x_axis.max_limit = Some(x.1);
    let mut y_axis = plotkit::core::Axis::new();
    y_axis.min_limit = Some(y.0);
    y_axis.max_limit = Some(y.1);
    chart.x_axes.push(x_axis);
    chart.y_axes.push(y_axis);
}

#[test]
fn column_geometry_matches_reference_vectors() {
    let mut chart = CartesianChart::new();
    pinned_axes(&mut chart, (0.0, 10.0), (0.0, 10.0));
    chart.series.push(
        Series::new(SeriesKind::Column(BarStyle {
            padding: 2.0,
            max_bar_width: 50.0,
            ..BarStyle::default()
        }))
        .with_data(vec![Coordinate::new(5.0, 10.0)]),
    );

    chart.measure(&settings()).expect("measure").expect("frame");

    let points = chart.series[0].points();
    let visual = points[&0].visual.as_ref().expect("visual");

    // One unit spans 100px, clamped to 50, padded by 2 -> 48px wide.
    assert_eq!(visual.target.width, 48.0);
    // Value 10 tops out the margin; pivot 0 anchors at the bottom.
    assert_eq!(visual.target.y, 0.0);
    assert_eq!(visual.target.height, 1000.0);
    // Centered on x = 500 plus the padding recentre of 1px.
    assert!((visual.target.x - (501.0 - 24.0)).abs() <= 1e-9);
}

#[test]
fn stacked_columns_receive_contiguous_intervals() {
    let mut chart = CartesianChart::new();
    pinned_axes(&mut chart, (0.0, 2.0), (0.0, 10.0));
    for value in [3.0, 5.0] {
        chart.series.push(
            Series::new(SeriesKind::Column(BarStyle::default()))
                .with_data(vec![Coordinate::new(1.0, value)])
                .with_stack_group(0),
        );
    }

    chart.measure(&settings()).expect("measure").expect("frame");

    let first = chart.series[0].points()[&0].stacked.expect("stacked");
    let second = chart.series[1].points()[&0].stacked.expect("stacked");
    assert_eq!((first.start, first.end), (0.0, 3.0));
    assert_eq!((second.start, second.end), (3.0, 8.0));

    // Stacked bars stand on each other's ends in pixel space.
    let lower = chart.series[0].points()[&0].visual.as_ref().expect("visual");
    let upper = chart.series[1].points()[&0].visual.as_ref().expect("visual");
    assert!((lower.target.y - (upper.target.y + upper.target.height)).abs() <= 1e-9);
}

#[test]
fn stacked_series_autoscale_on_their_totals() {
    let mut chart = CartesianChart::new();
    for value in [3.0, 5.0] {
        chart.series.push(
            Series::new(SeriesKind::Column(BarStyle::default()))
                .with_data(vec![Coordinate::new(0.0, value)])
                .with_stack_group(0),
        );
    }

    chart.measure(&settings()).expect("measure").expect("frame");

    // The value axis must reach the stacked sum, not the largest raw value.
    let (min, max) = chart.y_axes[0].resolve_range().expect("range");
    assert!(max >= 8.0, "stacked total clipped: max = {max}");
    assert!(min <= 0.0);
}

#[test]
fn line_series_link_consecutive_points_with_segments() {
    let mut chart = CartesianChart::new();
    pinned_axes(&mut chart, (0.0, 3.0), (0.0, 10.0));
    chart.series.push(
        Series::new(SeriesKind::Line { geometry_size: 6.0 }).with_data(vec![
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 4.0),
            Coordinate::new(2.0, 2.0),
        ]),
    );

    chart.measure(&settings()).expect("measure").expect("frame");

    let points = chart.series[0].points();
    assert!(points[&0].additional_visuals.is_empty());
    assert_eq!(points[&1].additional_visuals.len(), 1);
    assert_eq!(points[&2].additional_visuals.len(), 1);
    assert!(matches!(
        points[&1].additional_visuals[0].kind,
        VisualKind::PathSegment { .. }
    ));
}

#[test]
fn empty_coordinates_break_the_line_path() {
    let mut chart = CartesianChart::new();
    pinned_axes(&mut chart, (0.0, 4.0), (0.0, 10.0));
    chart.series.push(
        Series::new(SeriesKind::Line { geometry_size: 6.0 }).with_data(vec![
            Coordinate::new(0.0, 1.0),
            Coordinate::empty(),
            Coordinate::new(2.0, 2.0),
        ]),
    );

    chart.measure(&settings()).expect("measure").expect("frame");

    let points = chart.series[0].points();
    assert_eq!(chart.series[0].live_point_count(), 2);
    // The point after the gap starts a fresh path.
    assert!(points[&2].additional_visuals.is_empty());
}

#[test]
fn row_series_grow_along_x_from_the_pivot() {
    let mut chart = CartesianChart::new();
    pinned_axes(&mut chart, (0.0, 10.0), (0.0, 2.0));
    chart.series.push(
        Series::new(SeriesKind::Row(BarStyle::default()))
            .with_data(vec![Coordinate::new(1.0, 8.0)]),
    );

    chart.measure(&settings()).expect("measure").expect("frame");

    let visual = chart.series[0].points()[&0].visual.as_ref().expect("visual");
    // Value 8 of 10 spans 800px from the left edge.
    assert_eq!(visual.target.x, 0.0);
    assert!((visual.target.width - 800.0).abs() <= 1e-9);
    assert!(visual.target.height <= 50.0 + 1e-9);
}

#[test]
fn scatter_diameter_interpolates_over_the_weight_bounds() {
    let mut chart = CartesianChart::new();
    pinned_axes(&mut chart, (0.0, 3.0), (0.0, 10.0));
    chart.series.push(
        Series::new(SeriesKind::Scatter {
            min_geometry_size: 10.0,
            max_geometry_size: 30.0,
        })
        .with_data(vec![
            Coordinate::weighted(0.0, 1.0, 0.0),
            Coordinate::weighted(1.0, 2.0, 50.0),
            Coordinate::weighted(2.0, 3.0, 100.0),
        ]),
    );

    chart.measure(&settings()).expect("measure").expect("frame");

    let points = chart.series[0].points();
    let diameter = |index: usize| points[&index].visual.as_ref().expect("visual").target.width;
    assert_eq!(diameter(0), 10.0);
    assert_eq!(diameter(1), 20.0);
    assert_eq!(diameter(2), 30.0);
}

#[test]
fn financial_candles_carry_open_close_in_the_kind() {
    let mut chart = CartesianChart::new();
    pinned_axes(&mut chart, (0.0, 2.0), (0.0, 100.0));
    chart.series.push(
        Series::new(SeriesKind::Financial {
            max_bar_width: 20.0,
            up: Color::rgb(0.0, 1.0, 0.0),
            down: Color::rgb(1.0, 0.0, 0.0),
        })
        .with_data(vec![
            Coordinate::financial(1.0, 40.0, 80.0, 20.0, 60.0),
        ]),
    );

    chart.measure(&settings()).expect("measure").expect("frame");

    let visual = chart.series[0].points()[&0].visual.as_ref().expect("visual");
    let VisualKind::Candle { open_y, close_y } = visual.kind else {
        panic!("expected a candle, got {:?}", visual.kind);
    };

    // High 80 -> y 200, low 20 -> y 800 on a 0..100 axis over 1000px.
    assert!((visual.target.y - 200.0).abs() <= 1e-9);
    assert!((visual.target.height - 600.0).abs() <= 1e-9);
    assert!((open_y - 600.0).abs() <= 1e-9);
    assert!((close_y - 400.0).abs() <= 1e-9);
    // Close above open paints the up color.
    assert_eq!(visual.target.color, Some(Color::rgb(0.0, 1.0, 0.0)));
}

#[test]
fn heat_cells_blend_between_cold_and_hot() {
    let mut chart = CartesianChart::new();
    pinned_axes(&mut chart, (0.0, 2.0), (0.0, 2.0));
    chart.series.push(
        Series::new(SeriesKind::Heat {
            cold: Color::rgb(0.0, 0.0, 1.0),
            hot: Color::rgb(1.0, 0.0, 0.0),
        })
        .with_data(vec![
            Coordinate::weighted(0.0, 0.0, 0.0),
            Coordinate::weighted(1.0, 1.0, 100.0),
        ]),
    );

    chart.measure(&settings()).expect("measure").expect("frame");

    let points = chart.series[0].points();
    let cold = points[&0].visual.as_ref().expect("visual").target.color;
    let hot = points[&1].visual.as_ref().expect("visual").target.color;
    assert_eq!(cold, Some(Color::rgb(0.0, 0.0, 1.0)));
    assert_eq!(hot, Some(Color::rgb(1.0, 0.0, 0.0)));
}

#[test]
fn vanished_points_are_soft_deleted_and_drawn_once_more() {
    let mut chart = CartesianChart::new();
    pinned_axes(&mut chart, (0.0, 3.0), (0.0, 10.0));
    chart.series.push(
        Series::new(SeriesKind::Column(BarStyle::default())).with_data(vec![
            Coordinate::new(0.0, 3.0),
            Coordinate::new(1.0, 5.0),
            Coordinate::new(2.0, 2.0),
        ]),
    );

    chart.measure(&settings()).expect("measure").expect("frame");
    assert_eq!(chart.series[0].live_point_count(), 3);

    chart.series[0].data.truncate(2);
    let frame = chart.measure(&settings()).expect("measure").expect("frame");

    assert_eq!(chart.series[0].live_point_count(), 2);
    assert!(!chart.series[0].points().contains_key(&2));

    // The retired visual rides the frame once, flagged for removal and
    // collapsing to the pivot line.
    let retired: Vec<_> = frame
        .ops
        .iter()
        .filter(|op| op.visual.remove_on_completed)
        .collect();
    assert_eq!(retired.len(), 1);
    assert_eq!(retired[0].visual.target.height, 0.0);
}

#[test]
fn second_pass_retargets_visuals_in_place() {
    let mut chart = CartesianChart::new();
    pinned_axes(&mut chart, (0.0, 2.0), (0.0, 10.0));
    chart.series.push(
        Series::new(SeriesKind::Column(BarStyle::default()))
            .with_data(vec![Coordinate::new(1.0, 2.0)]),
    );

    chart.measure(&settings()).expect("measure").expect("frame");
    let first_target = chart.series[0].points()[&0]
        .visual
        .as_ref()
        .expect("visual")
        .target;

    chart.series[0].data[0] = Coordinate::new(1.0, 8.0);
    chart.measure(&settings()).expect("measure").expect("frame");

    let visual = chart.series[0].points()[&0].visual.as_ref().expect("visual");
    // The animation starts from the old resolved state.
    assert_eq!(visual.props, first_target);
    assert!(visual.target.height > first_target.height);
}

#[test]
fn hidden_series_are_skipped() {
    let mut chart = CartesianChart::new();
    pinned_axes(&mut chart, (0.0, 2.0), (0.0, 10.0));
    let mut series = Series::new(SeriesKind::Line { geometry_size: 5.0 })
        .with_data(vec![Coordinate::new(1.0, 5.0)]);
    series.visible = false;
    chart.series.push(series);

    chart.measure(&settings()).expect("measure").expect("frame");
    assert_eq!(chart.series[0].live_point_count(), 0);
}

#[test]
fn unload_resets_to_a_first_draw() {
    let mut chart = CartesianChart::new();
    pinned_axes(&mut chart, (0.0, 2.0), (0.0, 10.0));
    chart.series.push(
        Series::new(SeriesKind::Column(BarStyle::default()))
            .with_data(vec![Coordinate::new(1.0, 5.0)]),
    );

    chart.measure(&settings()).expect("measure").expect("frame");
    chart.unload();
    assert_eq!(chart.series[0].live_point_count(), 0);
    assert!(chart.x_axes[0].active_separators(chart.token()).is_none());

    chart.measure(&settings()).expect("measure").expect("frame");
    assert_eq!(chart.series[0].live_point_count(), 1);
}

#[test]
fn axis_ops_are_emitted_before_series_ops_at_equal_z() {
    let mut chart = CartesianChart::new();
    pinned_axes(&mut chart, (0.0, 10.0), (0.0, 10.0));
    // Lift the separators onto the series' z plane so the stable sort keeps
    // emission order between them.
    let level = Paint::stroke(Color::rgb(0.5, 0.5, 0.5), 1.0);
    chart.x_axes[0].separator_paint = Some(level);
    chart.y_axes[0].separator_paint = Some(level);
    chart.series.push(
        Series::new(SeriesKind::Column(BarStyle::default()))
            .with_data(vec![Coordinate::new(5.0, 7.0)]),
    );

    let frame = chart.measure(&settings()).expect("measure").expect("frame");

    let first_separator = frame
        .ops
        .iter()
        .position(|op| matches!(op.visual.kind, VisualKind::PathSegment { .. }))
        .expect("separator op");
    let first_bar = frame
        .ops
        .iter()
        .position(|op| matches!(op.visual.kind, VisualKind::Rectangle))
        .expect("bar op");
    assert!(
        first_separator < first_bar,
        "separators at {first_separator} drawn after bars at {first_bar}"
    );
}

#[test]
fn retired_line_segments_keep_their_stroke_paint() {
    let mut chart = CartesianChart::new();
    pinned_axes(&mut chart, (0.0, 3.0), (0.0, 10.0));
    chart.series.push(
        Series::new(SeriesKind::Line { geometry_size: 6.0 }).with_data(vec![
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 4.0),
            Coordinate::new(2.0, 2.0),
        ]),
    );

    chart.measure(&settings()).expect("measure").expect("frame");
    chart.series[0].data.truncate(2);
    let frame = chart.measure(&settings()).expect("measure").expect("frame");

    let retired: Vec<_> = frame
        .ops
        .iter()
        .filter(|op| op.visual.remove_on_completed)
        .collect();
    assert!(!retired.is_empty());
    for op in retired {
        match op.visual.kind {
            VisualKind::PathSegment { .. } => {
                assert!(matches!(op.paint.style, PaintStyle::Stroke { .. }))
            }
            _ => assert_eq!(op.paint.style, PaintStyle::Fill),
        }
    }
}

#[test]
fn row_entrance_seeds_from_the_previous_scalers() {
    let mut chart = CartesianChart::new();
    pinned_axes(&mut chart, (0.0, 10.0), (0.0, 2.0));
    chart.series.push(
        Series::new(SeriesKind::Row(BarStyle {
            padding: 0.0,
            max_bar_width: 10_000.0,
            ..BarStyle::default()
        }))
        .with_data(vec![Coordinate::new(1.0, 8.0)]),
    );

    chart.measure(&settings()).expect("measure").expect("frame");

    // Doubling the category range halves the row height; the point added on
    // this pass must enter at the previous pass's 500px row, not the new 250px.
    chart.y_axes[0].max_limit = Some(4.0);
    chart.series[0].data.push(Coordinate::new(3.0, 6.0));
    chart.measure(&settings()).expect("measure").expect("frame");

    let visual = chart.series[0].points()[&1].visual.as_ref().expect("visual");
    assert!((visual.target.height - 250.0).abs() <= 1e-9);
    assert!((visual.props.height - 500.0).abs() <= 1e-9);
}

#[test]
fn auto_margin_reserves_room_for_axis_labels() {
    let mut chart = CartesianChart::new();
    chart.series.push(
        Series::new(SeriesKind::Line { geometry_size: 5.0 })
            .with_data(vec![Coordinate::new(0.0, 1.0), Coordinate::new(10.0, 9.0)]),
    );

    let frame = chart
        .measure(&MeasureSettings {
            draw_margin_override: None,
            ..settings()
        })
        .expect("measure")
        .expect("frame");

    let margin = frame.draw_margin;
    assert!(margin.x > 0.0);
    assert!(margin.y > 0.0);
    assert!(margin.x + margin.width < 1000.0);
    assert!(margin.y + margin.height < 1000.0);
}
