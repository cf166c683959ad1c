use wasm_bindgen::prelude::*;
use ledgehop_core::{DrawList, MotionState, Params, Simulation, Viewport};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn set(obj: &js_sys::Object, key: &str, val: JsValue) -> Result<(), JsValue> {
    js_sys::Reflect::set(obj, &JsValue::from_str(key), &val)?;
    Ok(())
}

#[wasm_bindgen]
pub struct Game {
    sim: Simulation,
    draw: DrawList,
}

#[wasm_bindgen]
impl Game {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Result<Game, JsValue> {
        let vp = Viewport::new(width, height).map_err(js_err)?;
        let sim = Simulation::new(Params::default(), vp).map_err(js_err)?;
        Ok(Game { sim, draw: DrawList::new() })
    }

    /// `KeyboardEvent.code` of a keydown.
    pub fn key_down(&mut self, code: &str) {
        self.sim.key_down(code);
    }

    pub fn key_up(&mut self, code: &str) {
        self.sim.key_up(code);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.sim.resize(width, height);
    }

    pub fn blur(&mut self) {
        self.sim.push(ledgehop_core::Command::Blur);
    }

    pub fn reset(&mut self) {
        self.sim.reset_player();
    }

    /// Partial JSON; missing fields keep their defaults.
    pub fn set_params_json(&mut self, json: &str) -> Result<(), JsValue> {
        let params = Params::from_json(json).map_err(js_err)?;
        self.sim.set_params(params).map_err(js_err)
    }

    /// Call from requestAnimationFrame with its timestamp. Returns player state.
    pub fn frame(&mut self, now_ms: f64) -> Result<JsValue, JsValue> {
        let report = self.sim.frame(now_ms);
        self.sim.sync_renderer(&mut self.draw);

        let p = self.sim.player_aabb().center;
        let v = self.sim.player_velocity();
        let obj = js_sys::Object::new();
        set(&obj, "x", JsValue::from_f64(p.x as f64))?;
        set(&obj, "y", JsValue::from_f64(p.y as f64))?;
        set(&obj, "vx", JsValue::from_f64(v.x as f64))?;
        set(&obj, "vy", JsValue::from_f64(v.y as f64))?;
        set(&obj, "grounded", JsValue::from_bool(self.sim.motion_state() == MotionState::Grounded))?;
        set(&obj, "ticks", JsValue::from_f64(report.ticks as f64))?;
        set(&obj, "jumped", JsValue::from_bool(report.jumped))?;
        set(&obj, "landed", JsValue::from_bool(report.landed))?;

        Ok(JsValue::from(obj))
    }

    /// Packed sprites: [x,y,w,h,rotation,color, ...], player first.
    pub fn sprites(&self) -> Box<[f32]> {
        self.draw.packed().into_boxed_slice()
    }
}
