use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::scene::{SceneListeners, SceneManager};
use crate::config::ViewerConfig;
use crate::graph::{CommunityColoring, NodeAttrs, VisualScene};

const FRAME_DT: f32 = 0.016;
const DEFAULT_HEIGHT: f64 = 900.0;

/// Canvas that renders the current scene and reports taps.
///
/// A new `scene` value tears the previous scene down before the next one is
/// built; `None` leaves the canvas empty and hidden.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] scene: Signal<Option<Arc<VisualScene>>>,
	#[prop(into)] coloring: Signal<CommunityColoring>,
	#[prop(into)] selected: Signal<Option<String>>,
	#[prop(into)] on_node_tap: Callback<NodeAttrs>,
	#[prop(into)] on_background_tap: Callback<()>,
	#[prop(into)] on_scene_built: Callback<()>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let layout = use_context::<ViewerConfig>().unwrap_or_default().layout;
	let manager = Rc::new(RefCell::new(SceneManager::new(layout)));

	// unmount releases the live scene
	let teardown = StoredValue::new_local(manager.clone());
	on_cleanup(move || {
		teardown.try_with_value(|scenes| {
			if let Ok(mut scenes) = scenes.try_borrow_mut() {
				scenes.destroy();
			}
		});
	});

	let manager_build = manager.clone();
	Effect::new(move |_| {
		let next = scene.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let mut scenes = manager_build.borrow_mut();
		scenes.destroy();
		let Some(next) = next else {
			return;
		};

		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();
		let (w, h) = (
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.filter(|w| *w > 0.0)
				.unwrap_or(800.0),
			height.unwrap_or(DEFAULT_HEIGHT),
		);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		let listeners = SceneListeners {
			on_node_tap: Box::new(move |attrs: &NodeAttrs| on_node_tap.run(attrs.clone())),
			on_background_tap: Box::new(move || on_background_tap.run(())),
		};
		if let Err(err) = scenes.build(next, coloring.get_untracked(), (w, h), listeners) {
			error!("scene not built: {}", err);
			return;
		}

		let frame_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
		let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
		let (manager_anim, animate_inner, frame_inner) =
			(manager_build.clone(), animate.clone(), frame_id.clone());
		*animate.borrow_mut() = Some(Closure::new(move || {
			if let Ok(mut scenes) = manager_anim.try_borrow_mut() {
				if let Some(state) = scenes.state_mut() {
					state.tick(FRAME_DT);
					render::render(state, &ctx);
				}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				frame_inner.set(
					web_sys::window()
						.unwrap()
						.request_animation_frame(cb.as_ref().unchecked_ref())
						.ok(),
				);
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			frame_id.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
		scenes.attach_release(move || {
			if let Some(id) = frame_id.take() {
				let _ = web_sys::window().unwrap().cancel_animation_frame(id);
			}
			animate.borrow_mut().take();
		});

		let (manager_resize, canvas_resize) = (manager_build.clone(), canvas.clone());
		let resize_cb: Closure<dyn FnMut()> = Closure::new(move || {
			let nw = canvas_resize
				.parent_element()
				.map(|p| p.client_width() as f64)
				.unwrap_or(800.0);
			let nh = canvas_resize.height() as f64;
			canvas_resize.set_width(nw as u32);
			if let Ok(mut scenes) = manager_resize.try_borrow_mut() {
				if let Some(state) = scenes.state_mut() {
					state.resize(nw, nh);
				}
			}
		});
		let _ = window.add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());
		scenes.attach_release(move || {
			let _ = web_sys::window()
				.unwrap()
				.remove_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());
		});

		drop(scenes);
		on_scene_built.run(());
	});

	let manager_style = manager.clone();
	Effect::new(move |_| {
		let coloring = coloring.get();
		manager_style.borrow_mut().restyle(coloring);
	});

	let manager_highlight = manager.clone();
	Effect::new(move |_| {
		let selected = selected.get();
		manager_highlight.borrow_mut().highlight(selected.as_deref());
	});

	let pointer = move |ev: &MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	};

	let manager_md = manager.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let (x, y) = pointer(&ev);
		manager_md.borrow_mut().pointer_down(x, y);
	};

	let manager_mm = manager.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let (x, y) = pointer(&ev);
		manager_mm.borrow_mut().pointer_move(x, y);
	};

	let manager_mu = manager.clone();
	let on_mouseup = move |_: MouseEvent| {
		manager_mu.borrow_mut().pointer_up();
	};

	let manager_ml = manager.clone();
	let on_mouseleave = move |_: MouseEvent| {
		manager_ml.borrow_mut().pointer_leave();
	};

	let manager_wh = manager;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let mouse: &MouseEvent = &ev;
		let (x, y) = pointer(mouse);
		manager_wh.borrow_mut().zoom(x, y, ev.delta_y());
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="cursor: grab; border: 1px solid #ccc; border-radius: 4px;"
			style:display=move || if scene.with(Option::is_some) { "block" } else { "none" }
		/>
	}
}
