use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use web_sys::CanvasRenderingContext2d;

use super::state::{EdgeStyle, ForceGraphState};

const BACKGROUND: &str = "#fafafa";
const LABEL_COLOR: &str = "#333333";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let positions = state.positions();
	let radii = radii(state);
	let (has_highlight, t) = (
		state.has_active_highlight(),
		ease_out_cubic(state.highlight.highlight_t),
	);

	for edge in state.edges() {
		let (Some(&(x1, y1)), Some(&(x2, y2))) =
			(positions.get(&edge.source), positions.get(&edge.target))
		else {
			continue;
		};

		// highlighted edges keep full opacity, the rest fade towards 0.15
		let is_highlighted =
			has_highlight && state.is_highlighted(edge.source) && state.is_highlighted(edge.target);
		let alpha = if !has_highlight || is_highlighted {
			edge.opacity
		} else {
			edge.opacity - (edge.opacity - 0.15).max(0.0) * t
		};
		let (r1, r2) = (
			radii.get(&edge.source).copied().unwrap_or(0.0),
			radii.get(&edge.target).copied().unwrap_or(0.0),
		);

		if edge.source == edge.target {
			draw_loop(ctx, edge, (x1, y1), r1, alpha);
			continue;
		}
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let arrow_size = if state.directed {
			(edge.width * 3.0).max(6.0)
		} else {
			0.0
		};

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(&edge.color);
		ctx.set_line_width(edge.width);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(x1 + ux * r1, y1 + uy * r1);
		ctx.line_to(x2 - ux * (r2 + arrow_size), y2 - uy * (r2 + arrow_size));
		ctx.stroke();

		if state.directed {
			ctx.set_fill_style_str(&edge.color);
			let (tip_x, tip_y) = (x2 - ux * r2, y2 - uy * r2);
			let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
			let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
			ctx.begin_path();
			ctx.move_to(tip_x, tip_y);
			ctx.line_to(back_x + px, back_y + py);
			ctx.line_to(back_x - px, back_y - py);
			ctx.close_path();
			ctx.fill();
		}
	}
	ctx.set_global_alpha(1.0);
}

/// Self-interaction drawn as a ring resting on top of the node.
fn draw_loop(ctx: &CanvasRenderingContext2d, edge: &EdgeStyle, (x, y): (f64, f64), radius: f64, alpha: f64) {
	let loop_r = (radius * 0.6).max(6.0);
	ctx.set_global_alpha(alpha);
	ctx.set_stroke_style_str(&edge.color);
	ctx.set_line_width(edge.width);
	ctx.begin_path();
	let _ = ctx.arc(x, y - radius - loop_r * 0.5, loop_r, 0.0, 2.0 * PI);
	ctx.stroke();
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.highlight.highlight_t),
		state.transform.k,
	);
	let font = format!("{}px sans-serif", 10.0 / k.max(0.5));

	// dimmed nodes first so highlighted ones paint on top
	for pass_highlighted in [false, true] {
		state.graph.visit_nodes(|node| {
			let idx = node.index();
			let highlighted = has_highlight && state.is_highlighted(idx);
			if highlighted != pass_highlighted {
				return;
			}
			let info = &node.data.user_data;
			let (x, y) = (node.x() as f64, node.y() as f64);
			let alpha = if has_highlight && !highlighted {
				1.0 - 0.7 * t
			} else {
				1.0
			};

			ctx.set_global_alpha(alpha);
			ctx.begin_path();
			let _ = ctx.arc(x, y, info.radius, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(&info.fill);
			ctx.fill();

			if state.is_selected(idx) && t > 0.01 {
				ctx.begin_path();
				let _ = ctx.arc(x, y, info.radius + 3.0 / k, 0.0, 2.0 * PI);
				ctx.set_stroke_style_str(&format!("rgba(20, 20, 20, {})", 0.8 * t));
				ctx.set_line_width(2.0 / k);
				ctx.stroke();
			}

			ctx.set_fill_style_str(LABEL_COLOR);
			ctx.set_font(&font);
			ctx.set_text_align("center");
			let _ = ctx.fill_text(&info.label, x, y + info.radius + 12.0 / k.max(0.5));
			ctx.set_global_alpha(1.0);
		});
	}
}

fn radii(state: &ForceGraphState) -> HashMap<DefaultNodeIdx, f64> {
	let mut radii = HashMap::with_capacity(state.node_count());
	state.graph.visit_nodes(|node| {
		radii.insert(node.index(), node.data.user_data.radius);
	});
	radii
}
