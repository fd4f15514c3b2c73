#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Kinematics and tendon-routing engine for tendon-driven continuum robots
//! modelled as piecewise constant curvature (PCC) chains.
//!
//! - [`pcc`] computes the robot centreline and the coupling element frames.
//! - [`tendon`] places eyelets on those frames, measures tendon routing lengths
//!   against the straight configuration and derives actuation commands.
//! - [`Engine`] is the wasm-facing facade that owns the shape cache.

pub mod error;
pub mod geom;
pub mod pcc;
pub mod tendon;

use std::fmt;

use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

use error::EngineError;
use pcc::{
    CouplingFrameSource, PccParams, PccRobotModel, RobotShape, ShapeCache, ShapeCacheOptions,
    ShapeCacheStats, build_chain,
};
use tendon::{AnalysisResult, analyze_pcc};

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("kon rayon threadpool niet initialiseren: {err}")))
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Runtime options for [`Engine`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    pub cache: ShapeCacheOptions,
    pub frame_source: CouplingFrameSource,
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct Engine {
    initialized: bool,
    model: PccRobotModel,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Engine {
        Engine::with_options(EngineOptions::default())
    }

    /// Geeft terug of de engine de minimale initialisatie heeft doorlopen.
    #[wasm_bindgen]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Berekent de vorm van de robot: per segment een lijst punten.
    #[wasm_bindgen]
    pub fn compute_shape(&mut self, params: JsValue) -> Result<JsValue, JsValue> {
        let params = params_from_js(params)?;
        let shape = self.shape(&params).map_err(to_js_error)?;
        to_js(&shape)
    }

    /// Volledige peesanalyse: vorm, koppelingsframes, peeslengtes en aansturing.
    #[wasm_bindgen]
    pub fn analyze_tendons(&mut self, params: JsValue) -> Result<JsValue, JsValue> {
        let params = params_from_js(params)?;
        let result = self.analyze(&params).map_err(to_js_error)?;
        to_js(&result)
    }

    /// Leegt de vormcache.
    #[wasm_bindgen]
    pub fn clear_cache(&mut self) {
        self.model.cache_mut().clear();
    }

    /// Aantal vormen in de cache.
    #[wasm_bindgen]
    pub fn cache_size(&self) -> usize {
        self.model.cache().len()
    }
}

impl Engine {
    #[must_use]
    pub fn with_options(options: EngineOptions) -> Self {
        let model = PccRobotModel::new()
            .with_frame_source(options.frame_source)
            .with_cache(ShapeCache::with_options(options.cache));
        Self {
            initialized: true,
            model,
        }
    }

    /// Shape through the engine's cache.
    pub fn shape(&mut self, params: &PccParams) -> Result<RobotShape, EngineError> {
        Ok(build_chain(params, self.model.cache_mut())?)
    }

    /// Full analysis with the tendon configuration carried by `params`.
    pub fn analyze(&mut self, params: &PccParams) -> Result<AnalysisResult, EngineError> {
        let result = analyze_pcc(&mut self.model, params)?;
        debug_log!(
            "analyse klaar: {} segmenten, {} pezen",
            result.robot_positions.len(),
            result.actuation_commands.len()
        );
        Ok(result)
    }

    /// JSON in, JSON out; the boundary used outside the browser.
    pub fn analyze_json(&mut self, payload: &str) -> Result<String, EngineError> {
        let params: PccParams =
            serde_json::from_str(payload).map_err(|err| EngineError::Payload(err.to_string()))?;
        let result = self.analyze(&params)?;
        serde_json::to_string(&result).map_err(|err| EngineError::Payload(err.to_string()))
    }

    #[must_use]
    pub fn cache_stats(&self) -> ShapeCacheStats {
        self.model.cache().stats()
    }

    #[must_use]
    pub fn frame_source(&self) -> CouplingFrameSource {
        self.model.frame_source()
    }
}

fn params_from_js(params: JsValue) -> Result<PccParams, JsValue> {
    serde_wasm_bindgen::from_value(params)
        .map_err(|err| to_js_error(EngineError::Payload(err.to_string())))
}

/// Plain JS objects rather than `Map`s, so tendon ids stay object keys.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(to_js_error)
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
