#![warn(missing_docs)]
//! Builder Core - Headless Document Model for a Visual Page Builder
//!
//! # Overview
//!
//! `builder-core` owns the in-memory forest of page components behind a drag-and-drop page
//! builder: the nodes, their mutation operations, the selection/hover cursors and a bounded,
//! fully reversible edit history. It does not render anything; the canvas, inspector and layer
//! panel are expected to read the forest and call back into the store.
//!
//! # Core Features
//!
//! - **Arena Forest**: id-indexed node map with ordered child id lists and `parent_id` back-references
//! - **Mutation API**: add, remove, update, move, duplicate, copy/paste, each one undo step
//! - **Full-Snapshot History**: bounded linear undo/redo with redo truncation
//! - **Drag-and-Drop**: `dropzone-{parent|root}-{index}` descriptor decoding
//! - **State Tracking**: dirty flag, version number and change notifications
//! - **Persistence & Autosave**: pluggable gateway, JSON file backend
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Commands (serde) / Autosave / Codegen      │  ← Host integration
//! ├─────────────────────────────────────────────┤
//! │  PageStore (Mutation API, notifications)    │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  History · Selection · Clipboard · Drop     │  ← Editing state
//! ├─────────────────────────────────────────────┤
//! │  NodeRepository (arena forest)              │  ← Structure
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use builder_core::{BuilderConfig, NodeId, NodePatch, NodeSpec, PageStore, SequentialIdGenerator, StateChangeType};
//!
//! let mut store = PageStore::with_id_generator(BuilderConfig::default(), SequentialIdGenerator::new("n"));
//!
//! store.subscribe(|change| {
//!     if change.change_type == StateChangeType::ForestChanged {
//!         println!("forest changed: {:?}", change.affected);
//!     }
//! });
//!
//! let section = store.add(NodeSpec::new("section"), None).unwrap();
//! let text = store
//!     .add(NodeSpec::new("text").with_prop("text", "Hello"), Some(&section))
//!     .unwrap();
//! store.update(&text, NodePatch::prop("text", "Hello, World!"));
//!
//! // Pull the text out to the root list, in front of the section.
//! store.drop_node(&text, "dropzone-root-0").unwrap();
//! assert_eq!(store.repository().roots(), &[text.clone(), section.clone()]);
//!
//! store.undo();
//! assert_eq!(store.find(&text).unwrap().parent_id, Some(section));
//! ```
//!
//! # Module Description
//!
//! - [`node`] - Component node data model
//! - [`repository`] - Arena forest and structural primitives
//! - [`store`] - Mutation API and state management
//! - [`history`] - Snapshot undo/redo history
//! - [`drop_target`] - Drop-zone descriptor decoding
//! - [`commands`] - Serializable command interface
//! - [`persistence`] / [`autosave`] - Save/load boundary
//! - [`codegen`] - Code generation boundary

pub mod autosave;
pub mod clipboard;
pub mod codegen;
pub mod commands;
pub mod config;
pub mod drop_target;
mod error;
pub mod history;
pub mod id;
pub mod node;
pub mod persistence;
pub mod repository;
pub mod selection;
pub mod store;

pub use autosave::{Autosave, AutosaveOutcome};
pub use clipboard::Clipboard;
pub use codegen::{CodeGenerator, OutlineGenerator};
pub use commands::{Command, CommandError, CommandResult};
pub use config::BuilderConfig;
pub use drop_target::{DropTarget, DropTargetError, ROOT_SENTINEL};
pub use error::{BuilderError, ConfigError, ForestError, PersistenceError};
pub use history::{HistoryEntry, HistoryManager};
pub use id::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use node::{ComponentNode, ComponentTree, NodeId, NodePatch, NodeSpec, Props};
pub use persistence::{JsonFileGateway, MemoryGateway, PersistenceGateway};
pub use repository::NodeRepository;
pub use selection::{DragState, SelectionState};
pub use store::{PageState, PageStore, StateChange, StateChangeCallback, StateChangeType};
