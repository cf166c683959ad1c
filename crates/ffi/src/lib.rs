use std::ffi::{c_char, CStr};

use ledgehop_core::{Command, Key, MotionState, Params, Simulation, TickReport, Viewport};

#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub grounded: u8,
    pub airborne: u8,
    pub jumped: u8,
    pub landed: u8,
}

fn player_state(sim: &Simulation, report: Option<&TickReport>) -> PlayerState {
    let p = sim.player_aabb().center;
    let v = sim.player_velocity();
    PlayerState {
        x: p.x,
        y: p.y,
        vx: v.x,
        vy: v.y,
        grounded: report.map_or(sim.is_grounded(), |r| r.grounded) as u8,
        airborne: (sim.motion_state() == MotionState::Airborne) as u8,
        jumped: report.is_some_and(|r| r.control.jumped) as u8,
        landed: report.is_some_and(|r| r.control.landed) as u8,
    }
}

/// Demo level with default params. Null if the viewport is invalid.
#[no_mangle]
pub extern "C" fn ledgehop_create(width: f32, height: f32) -> *mut Simulation {
    let sim = Viewport::new(width, height).and_then(|vp| Simulation::new(Params::default(), vp));
    match sim {
        Ok(sim) => Box::into_raw(Box::new(sim)),
        Err(e) => {
            log::error!("ledgehop_create: {e}");
            std::ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "C" fn ledgehop_destroy(sim: *mut Simulation) {
    if !sim.is_null() {
        drop(unsafe { Box::from_raw(sim) });
    }
}

/// `key` indexes `Key::ALL`. Returns 0 for an unknown key.
#[no_mangle]
pub extern "C" fn ledgehop_key(sim: *mut Simulation, key: u8, pressed: u8) -> u8 {
    let Some(s) = (unsafe { sim.as_mut() }) else { return 0 };
    match Key::from_index(key) {
        Some(key) => {
            s.push(Command::Key { key, pressed: pressed != 0 });
            1
        }
        None => 0,
    }
}

#[no_mangle]
pub extern "C" fn ledgehop_resize(sim: *mut Simulation, width: f32, height: f32) {
    if let Some(s) = unsafe { sim.as_mut() } {
        s.resize(width, height);
    }
}

#[no_mangle]
pub extern "C" fn ledgehop_blur(sim: *mut Simulation) {
    if let Some(s) = unsafe { sim.as_mut() } {
        s.push(Command::Blur);
    }
}

#[no_mangle]
pub extern "C" fn ledgehop_tick(sim: *mut Simulation, now_ms: f64) -> PlayerState {
    let Some(s) = (unsafe { sim.as_mut() }) else { return PlayerState::default() };
    let r = s.tick(now_ms);
    player_state(s, Some(&r))
}

/// Runs the fixed ticks due at `now_ms`. Flags reflect the last tick run.
#[no_mangle]
pub extern "C" fn ledgehop_frame(sim: *mut Simulation, now_ms: f64) -> PlayerState {
    let Some(s) = (unsafe { sim.as_mut() }) else { return PlayerState::default() };
    let f = s.frame(now_ms);
    let mut out = player_state(s, f.last.as_ref());
    out.jumped = f.jumped as u8;
    out.landed = f.landed as u8;
    out
}

/// Partial JSON params, NUL-terminated UTF-8. Returns 1 on success, 0 if rejected.
#[no_mangle]
pub extern "C" fn ledgehop_set_params_json(sim: *mut Simulation, json: *const c_char) -> u8 {
    let Some(s) = (unsafe { sim.as_mut() }) else { return 0 };
    if json.is_null() {
        return 0;
    }
    let Ok(text) = unsafe { CStr::from_ptr(json) }.to_str() else {
        log::error!("ledgehop_set_params_json: params are not utf-8");
        return 0;
    };
    match Params::from_json(text).and_then(|p| s.set_params(p)) {
        Ok(()) => 1,
        Err(e) => {
            log::error!("ledgehop_set_params_json: {e}");
            0
        }
    }
}

#[no_mangle]
pub extern "C" fn ledgehop_player(sim: *const Simulation) -> PlayerState {
    let Some(s) = (unsafe { sim.as_ref() }) else { return PlayerState::default() };
    player_state(s, None)
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;

    use super::*;

    #[test]
    fn params_json_reaches_simulation() {
        let sim = ledgehop_create(800.0, 600.0);
        assert!(!sim.is_null());

        let good = CString::new(r#"{ "move_speed": 8.0 }"#).unwrap();
        assert_eq!(ledgehop_set_params_json(sim, good.as_ptr()), 1);
        assert_eq!(unsafe { &*sim }.params().move_speed, 8.0);

        let bad = CString::new(r#"{ "ground_tolerance": -1.0 }"#).unwrap();
        assert_eq!(ledgehop_set_params_json(sim, bad.as_ptr()), 0);
        assert_eq!(unsafe { &*sim }.params().ground_tolerance, Params::default().ground_tolerance);

        assert_eq!(ledgehop_set_params_json(sim, std::ptr::null()), 0);
        ledgehop_destroy(sim);
    }

    #[test]
    fn frame_settles_player_and_walks() {
        let sim = ledgehop_create(800.0, 600.0);
        let dt = ledgehop_core::DT_MS;
        let mut state = PlayerState::default();
        for i in 0..120 {
            state = ledgehop_frame(sim, i as f64 * dt);
        }
        assert_eq!(state.grounded, 1);
        assert_eq!(state.airborne, 0);

        assert_eq!(ledgehop_key(sim, Key::ArrowRight as u8, 1), 1);
        let state = ledgehop_frame(sim, 121.5 * dt);
        assert_eq!(state.vx, 5.0);
        assert_eq!(ledgehop_key(sim, 200, 1), 0);
        ledgehop_destroy(sim);
    }
}
