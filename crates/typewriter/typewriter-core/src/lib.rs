//! Typewriter Core (host-agnostic)
//!
//! Reveals and erases text one grapheme at a time against a virtual clock.
//! A [`Stage`] owns many targets, each driven by one [`Typewriter`] state
//! machine; hosts (the browser adapter, tests, terminal demos) supply
//! [`TextSurface`]s, forward trigger signals, and advance time.
//!
//! ```
//! use typewriter_core::{Config, MemorySurface, Script, Stage, Triggers};
//!
//! let mut stage = Stage::new();
//! let banner = MemorySurface::new("");
//! let id = stage
//!     .mount(
//!         banner.clone(),
//!         Some(Script::new(["Ronogamy.", "Aditya."]).unwrap()),
//!         Config::default(),
//!         Triggers::load().with_hover(),
//!     )
//!     .unwrap();
//! stage.ready();
//! stage.advance(9 * 80);
//! assert_eq!(banner.text(), "Ronogamy.");
//! assert!(stage.typewriter(id).unwrap().settled_index() == Some(0));
//! ```

pub mod config;
pub mod error;
pub mod ids;
pub mod outputs;
pub mod scene;
pub mod script;
pub mod stage;
pub mod surface;
pub mod timers;
pub mod triggers;
pub mod typewriter;

// Re-exports for consumers (hosts)
pub use config::{Config, ConfigPatch, Preset};
pub use error::TypewriterError;
pub use ids::{TargetId, TimerId};
pub use outputs::{Outputs, RunKind, TypewriterEvent};
pub use scene::{MountSpec, SceneSpec, Stagger};
pub use script::{Line, Script};
pub use stage::Stage;
pub use surface::{MemorySurface, TextSurface};
pub use timers::TimerQueue;
pub use triggers::{HoverIntent, TriggerKind, Triggers};
pub use typewriter::{AnimationState, Typewriter};
