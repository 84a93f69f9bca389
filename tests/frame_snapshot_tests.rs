use plotkit::core::types::ControlSize;
use plotkit::core::{
    BarStyle, CartesianChart, Coordinate, DrawMargin, MeasureSettings, Series, SeriesKind,
};
use plotkit::render::{Color, DrawOp, NullRenderer, Renderer};

fn settings() -> MeasureSettings {
    MeasureSettings {
        control_size: ControlSize::new(800.0, 600.0),
        draw_margin_override: Some(DrawMargin::new(0.0, 0.0, 800.0, 600.0)),
        transition: None,
        palette: vec![Color::rgb(0.2, 0.4, 0.8)],
    }
}

fn measured_frame() -> plotkit::render::RenderFrame {
    let mut chart = CartesianChart::new();
    chart.series.push(
        Series::new(SeriesKind::Column(BarStyle::default())).with_data(vec![
            Coordinate::new(0.0, 3.0),
            Coordinate::new(1.0, 7.0),
        ]),
    );
    chart.measure(&settings()).expect("measure").expect("frame")
}

#[test]
fn frame_ops_serialize_and_round_trip() {
    let frame = measured_frame();
    let json = frame.ops_to_json().expect("serialize");

    let ops: Vec<DrawOp> = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(ops.len(), frame.len());
}

#[test]
fn ops_are_sorted_by_z_index() {
    let frame = measured_frame();

    let mut previous = i32::MIN;
    for op in &frame.ops {
        assert!(op.paint.z_index >= previous);
        previous = op.paint.z_index;
    }
}

#[test]
fn null_renderer_consumes_frames() {
    let frame = measured_frame();
    let mut renderer = NullRenderer::default();

    renderer.render(&frame).expect("render");
    renderer.render(&frame).expect("render");

    assert_eq!(renderer.frames_rendered(), 2);
    assert_eq!(renderer.last_op_count(), frame.len());
}
