//! Reinhardt Elements - Custom Element Bridge for Page Components
//!
//! Registers `Page` components as custom elements. A registered component can be
//! rendered on the server as static markup and, on the client, either hydrated
//! from that markup or mounted fresh, with the host page talking to it only
//! through attributes, an embedded JSON block and tagged child markup.
//!
//! ## Features
//!
//! - **Three Props Sources**: the `props` JSON attribute, an embedded
//!   `<script type="application/json">` block, and whitelisted attributes
//! - **Slots**: direct children with `slot="name"` become named props; the rest
//!   is passed as `children`
//! - **Deferred Factories**: components can resolve on a microtask queue, with
//!   module exports inferred by name or by being the only candidate
//! - **SSR + Hydration**: server markup carries its props and is adopted on the
//!   client when it matches
//! - **Move Safe**: extracted children survive a disconnect/reconnect
//!
//! ## Architecture
//!
//! - [`registry`]: tag registration and the [`ElementRegistry`]
//! - [`element`]: the mount state machine driven by DOM callbacks
//! - [`resolver`]: component inference from factory exports
//! - [`props`]: props merging and precedence
//! - [`slots`]: slot and children extraction
//! - [`cache`]: element-keyed weak side tables
//! - [`renderer`]: render capability and the DOM renderer
//! - [`ssr`]: server markup with embedded props
//! - [`dom`]: in-memory host document
//! - [`page`] and [`parse`]: renderable trees and HTML fragment parsing
//!
//! ## Example
//!
//! ```
//! use reinhardt_elements::prelude::*;
//!
//! fn message(props: &Props) -> Page {
//!     Page::fragment([
//!         props.node("customTitle").map(|title| PageElement::new("h2").child(title)).into_page(),
//!         PageElement::new("em")
//!             .child(props.get_str("value").unwrap_or_default().to_owned())
//!             .into_page(),
//!         props.children().cloned().into_page(),
//!     ])
//! }
//!
//! // Server
//! let server = ElementRegistry::server(ElementsConfig::default());
//! let factory = server
//!     .define("message-one", || Component::new(message), DefineOptions::new())
//!     .unwrap();
//! let mut props = PropsMap::new();
//! props.insert("value".into(), "serverValue".into());
//! let markup = factory.render_to_string(props).unwrap();
//!
//! // Client
//! let client = ElementRegistry::interactive(ElementsConfig::default());
//! client
//!     .define("message-one", || Component::new(message), DefineOptions::new())
//!     .unwrap();
//! let document = Document::new(&client);
//! document.body().set_inner_html(&markup);
//!
//! let element = &document.body().child_elements()[0];
//! assert_eq!(client.state_of(element), Some(MountState::Mounted));
//! assert!(element.inner_html().starts_with("<em>serverValue</em>"));
//! ```

#![warn(missing_docs)]

// Logging macros
pub mod logging;

// Core types
pub mod component;
pub mod error;
pub mod page;
pub mod parse;

// Props, slots and per-element storage
pub mod cache;
pub mod props;
pub mod slots;

// Registration and lifecycle
pub mod config;
pub mod element;
pub mod registry;
pub mod resolver;

// Rendering
pub mod dom;
pub mod renderer;
pub mod ssr;

// Unified prelude for simplified imports
pub mod prelude;

// Re-export commonly used types
pub use component::{Component, ComponentResult, Export, ModuleItem};
pub use config::{DefineOptions, ElementsConfig};
pub use dom::{Document, Element, LifecycleObserver};
pub use element::MountState;
pub use error::{ElementError, PropsSource, Result};
pub use page::{IntoPage, Page, PageElement};
pub use parse::parse_html;
pub use props::{Props, PropsMap, prop_key};
pub use registry::ElementRegistry;
pub use renderer::{DomRenderer, RenderMode, Renderer};
pub use slots::SlotMap;
pub use ssr::ElementFactory;
