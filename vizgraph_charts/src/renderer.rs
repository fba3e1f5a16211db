// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The renderer boundary and event channels.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use hashbrown::HashMap;

use crate::orchestrator::{IntermediateNode, NodeMetadata, NodePath};

/// A renderer failure, tagged with the path of the node being drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderFailure<E> {
    /// Path of the node the renderer was drawing.
    pub path: NodePath,
    /// The renderer's error.
    pub error: E,
}

/// Turns a resolved tree into output (a document, a scene, draw calls).
pub trait Renderer {
    /// What a successful render produces.
    type Output;
    /// The renderer's error type.
    type Error;

    /// Renders a resolved tree. Elements that produce events report them through `channels`.
    fn render(
        &mut self,
        tree: &IntermediateNode,
        channels: &Channels,
    ) -> Result<Self::Output, RenderFailure<Self::Error>>;
}

/// An event raised by a renderer on a named channel.
#[derive(Clone, Copy)]
pub struct ChannelEvent<'a> {
    /// Which node, mark and element raised the event.
    pub node: &'a NodeMetadata,
    /// The renderer-native event payload.
    pub event: &'a dyn Any,
}

impl fmt::Debug for ChannelEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelEvent")
            .field("node", &self.node)
            .field("event", &"<dyn Any>")
            .finish()
    }
}

type Handler = Box<dyn Fn(&ChannelEvent<'_>)>;

/// Named event callbacks handed to a [`Renderer`].
#[derive(Default)]
pub struct Channels {
    handlers: HashMap<String, Vec<Handler>>,
}

impl fmt::Debug for Channels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, handlers) in &self.handlers {
            map.entry(name, &handlers.len());
        }
        map.finish()
    }
}

impl Channels {
    /// Creates an empty channel map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler for `name` (for example `"click"` or `"mouseover"`).
    pub fn on(mut self, name: impl Into<String>, f: impl Fn(&ChannelEvent<'_>) + 'static) -> Self {
        self.handlers.entry(name.into()).or_default().push(Box::new(f));
        self
    }

    /// Returns `true` if any handler listens on `name`.
    pub fn listens(&self, name: &str) -> bool {
        self.handlers.get(name).is_some_and(|h| !h.is_empty())
    }

    /// Iterates over channel names with at least one handler.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers
            .iter()
            .filter(|(_, h)| !h.is_empty())
            .map(|(k, _)| k.as_str())
    }

    /// Calls every handler on `name`, in registration order. Returns how many ran.
    pub fn emit(&self, name: &str, event: &ChannelEvent<'_>) -> usize {
        let Some(handlers) = self.handlers.get(name) else {
            return 0;
        };
        for handler in handlers {
            handler(event);
        }
        handlers.len()
    }
}
