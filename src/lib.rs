// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Cooperative Economy Simulation Engine

pub mod params;
pub mod types;
pub mod error;
pub mod stats;
pub mod stress;
pub mod scale;
pub mod participation;
pub mod context;
pub mod factory;
pub mod regime_a;
pub mod regime_b;
pub mod metrics;
pub mod events;
pub mod narrative;
pub mod simulation;

pub use error::{SimError, TransitionError};
pub use params::{Calibration, ConfigError, EconomicShock, SimulationParams};
pub use simulation::{run, CoopSimulation, FaultCounts, RunPhase};
pub use types::*;

use serde::Serialize;
use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

fn install_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_err(err: SimError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// `undefined`/`null` select the defaults; partial objects fill missing fields.
fn params_from_js(value: JsValue) -> Result<SimulationParams, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(SimulationParams::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&format!("invalid parameters: {e}")))
}

#[wasm_bindgen]
pub fn default_params() -> Result<JsValue, JsValue> {
    to_js(&SimulationParams::default())
}

/// Run a whole simulation and return the result bundle.
#[wasm_bindgen]
pub fn run_simulation(params: JsValue) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let results = run(params_from_js(params)?).map_err(js_err)?;
    to_js(&results)
}

/// Stepping handle for interactive front ends.
#[wasm_bindgen]
pub struct WasmSimulation {
    inner: CoopSimulation,
}

#[wasm_bindgen]
impl WasmSimulation {
    #[wasm_bindgen(constructor)]
    pub fn new(params: JsValue) -> Result<WasmSimulation, JsValue> {
        install_panic_hook();
        let inner = CoopSimulation::new(params_from_js(params)?).map_err(js_err)?;
        Ok(Self { inner })
    }

    /// Simulate one week and return its metrics.
    pub fn step(&mut self) -> Result<JsValue, JsValue> {
        let metrics = self.inner.step_week().map_err(js_err)?;
        to_js(metrics)
    }

    /// Step up to `weeks` weeks without returning metrics. Returns the weeks run.
    pub fn run_batch(&mut self, weeks: u32) -> Result<u32, JsValue> {
        let mut ran = 0;
        while ran < weeks && !self.inner.is_complete() {
            self.inner.step_week().map_err(js_err)?;
            ran += 1;
        }
        Ok(ran)
    }

    pub fn week(&self) -> u32 {
        self.inner.week()
    }

    pub fn seed(&self) -> u64 {
        self.inner.seed()
    }

    pub fn is_complete(&self) -> bool {
        self.inner.is_complete()
    }

    pub fn get_members(&self) -> Result<JsValue, JsValue> {
        let snapshots: Vec<MemberSnapshot> = self.inner.members().iter().map(Member::snapshot).collect();
        to_js(&snapshots)
    }

    pub fn get_history(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.history())
    }

    pub fn get_events(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.key_events())
    }

    /// Consume the handle and assemble the result bundle.
    pub fn finish(self) -> Result<JsValue, JsValue> {
        let results = self.inner.finish().map_err(js_err)?;
        to_js(&results)
    }
}
