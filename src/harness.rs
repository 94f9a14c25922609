//! In-memory stand-ins for the browser, for deterministic native tests.
//!
//! [`ManualScheduler`] only runs frames and timers when told to,
//! [`FakePage`] is a tiny DOM tree with selector lookup, and
//! [`RecordingSurface`] logs every draw call.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::page::Page;
use crate::schedule::{Callback, FrameId, Scheduler};
use crate::storage::Storage;
use crate::surface::{ColorStop, Point, Surface};
use crate::theme::Rgba;

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ManualScheduler {
    next_frame: Cell<i32>,
    frames: RefCell<Vec<(FrameId, Callback)>>,
    next_timer: Cell<u64>,
    timers: RefCell<Vec<(Duration, u64, Callback)>>,
    now: Cell<Duration>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every frame callback queued before this call. Callbacks
    /// requested while running wait for the next frame, as in a browser.
    /// Returns how many callbacks ran.
    pub fn run_frame(&self) -> usize {
        let due = std::mem::take(&mut *self.frames.borrow_mut());
        let ran = due.len();
        for (_, callback) in due {
            callback();
        }
        ran
    }

    pub fn run_frames(&self, count: usize) {
        for _ in 0..count {
            self.run_frame();
        }
    }

    /// Moves the clock forward, firing due timers in deadline order.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let earliest = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, (due, _, _))| *due <= target)
                    .min_by_key(|(_, (due, seq, _))| (*due, *seq))
                    .map(|(index, _)| index);
                earliest.map(|index| timers.remove(index))
            };
            let Some((due, _, callback)) = next else {
                break;
            };
            self.now.set(due);
            callback();
        }
        self.now.set(target);
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&self, callback: Callback) -> Result<FrameId> {
        let id = FrameId(self.next_frame.get() + 1);
        self.next_frame.set(id.0);
        self.frames.borrow_mut().push((id, callback));
        Ok(id)
    }

    fn cancel_frame(&self, id: FrameId) {
        self.frames.borrow_mut().retain(|(pending, _)| *pending != id);
    }

    fn set_timeout(&self, delay: Duration, callback: Callback) -> Result<()> {
        let seq = self.next_timer.get();
        self.next_timer.set(seq + 1);
        self.timers
            .borrow_mut()
            .push((self.now.get() + delay, seq, callback));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Storage that refuses every access, like a browser with storage disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockedStorage;

impl Storage for BlockedStorage {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::Storage("access denied".to_owned()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(Error::Storage("access denied".to_owned()))
    }
}

// ---------------------------------------------------------------------------
// DOM
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Minimal DOM tree supporting `.class`, `#id` and `tag` selectors and
/// comma-separated lists of them.
#[derive(Debug)]
pub struct FakePage {
    nodes: RefCell<Vec<Node>>,
    body: Option<NodeId>,
}

const ROOT: NodeId = NodeId(0);

impl FakePage {
    /// `<html>` with an empty `<body>`.
    pub fn new() -> Self {
        let page = Self::without_body();
        let body = page.insert(ROOT, "body", &[], None);
        Self {
            body: Some(body),
            ..page
        }
    }

    /// `<html>` only, as seen by scripts running in `<head>`.
    pub fn without_body() -> Self {
        let root = Node {
            tag: "html".to_owned(),
            ..Node::default()
        };
        Self {
            nodes: RefCell::new(vec![root]),
            body: None,
        }
    }

    /// Appends a new element under `parent`.
    pub fn insert(&self, parent: NodeId, tag: &str, classes: &[&str], id: Option<&str>) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        let node = NodeId(nodes.len());
        let mut attributes = BTreeMap::new();
        if let Some(id) = id {
            attributes.insert("id".to_owned(), id.to_owned());
        }
        nodes.push(Node {
            tag: tag.to_owned(),
            classes: classes.iter().map(|c| (*c).to_owned()).collect(),
            attributes,
            parent: Some(parent),
            ..Node::default()
        });
        nodes[parent.0].children.push(node);
        node
    }

    /// Appends a new element under `<body>`.
    ///
    /// # Panics
    /// When the page was built without a body.
    pub fn insert_in_body(&self, tag: &str, classes: &[&str], id: Option<&str>) -> NodeId {
        let body = self.body.expect("page has no body");
        self.insert(body, tag, classes, id)
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.nodes.borrow()[node.0].classes.clone()
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[node.0].attributes.get(name).cloned()
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.nodes.borrow()[node.0].style.get(property).cloned()
    }

    pub fn text(&self, node: NodeId) -> String {
        self.nodes.borrow()[node.0].text.clone()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node.0].children.clone()
    }

    /// Number of attached elements matching `selector`.
    pub fn count(&self, selector: &str) -> usize {
        self.query_all(selector).len()
    }

    fn matches(node: &Node, selector: &str) -> bool {
        selector.split(',').map(str::trim).any(|simple| {
            if let Some(class) = simple.strip_prefix('.') {
                node.classes.iter().any(|c| c == class)
            } else if let Some(id) = simple.strip_prefix('#') {
                node.attributes.get("id").map(String::as_str) == Some(id)
            } else {
                node.tag == simple
            }
        })
    }

    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = nodes[scope.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(nodes[node.0].children.iter().rev().copied());
        }
        out
    }

    fn find(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let found = self.descendants(scope);
        let nodes = self.nodes.borrow();
        found
            .into_iter()
            .filter(|node| Self::matches(&nodes[node.0], selector))
            .collect()
    }
}

impl Default for FakePage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for FakePage {
    type Element = NodeId;

    fn root(&self) -> NodeId {
        ROOT
    }

    fn body(&self) -> Option<NodeId> {
        self.body
    }

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.find(ROOT, selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.find(ROOT, selector)
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        self.find(*scope, selector).into_iter().next()
    }

    fn create(&self, tag: &str) -> Result<NodeId> {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(Node {
            tag: tag.to_owned(),
            ..Node::default()
        });
        Ok(NodeId(nodes.len() - 1))
    }

    fn append(&self, parent: &NodeId, child: &NodeId) -> Result<()> {
        self.remove(child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[child.0].parent = Some(*parent);
        nodes[parent.0].children.push(*child);
        Ok(())
    }

    fn remove(&self, element: &NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[element.0].parent.take() {
            nodes[parent.0].children.retain(|c| c != element);
        }
    }

    fn clear_children(&self, element: &NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        let children = std::mem::take(&mut nodes[element.0].children);
        for child in children {
            nodes[child.0].parent = None;
        }
        nodes[element.0].text.clear();
    }

    fn add_class(&self, element: &NodeId, class: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let classes = &mut nodes[element.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_owned());
        }
    }

    fn remove_class(&self, element: &NodeId, class: &str) {
        self.nodes.borrow_mut()[element.0]
            .classes
            .retain(|c| c != class);
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.nodes.borrow()[element.0]
            .classes
            .iter()
            .any(|c| c == class)
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) {
        self.nodes.borrow_mut()[element.0]
            .attributes
            .insert(name.to_owned(), value.to_owned());
    }

    fn set_text(&self, element: &NodeId, text: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let children = std::mem::take(&mut nodes[element.0].children);
        for child in children {
            nodes[child.0].parent = None;
        }
        nodes[element.0].text = text.to_owned();
    }

    fn set_style(&self, element: &NodeId, property: &str, value: &str) {
        self.nodes.borrow_mut()[element.0]
            .style
            .insert(property.to_owned(), value.to_owned());
    }
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear,
    Wash(Rgba),
    RadialGlow {
        center: Point,
        radius: f64,
        stops: Vec<ColorStop>,
    },
    GlowDot {
        center: Point,
        radius: f64,
        color: Rgba,
        blur: f64,
    },
    Streak {
        from: Point,
        to: Point,
        head: Rgba,
        width: f64,
    },
}

#[derive(Debug)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear);
    }

    fn wash(&mut self, color: Rgba) {
        self.calls.push(DrawCall::Wash(color));
    }

    fn radial_glow(&mut self, center: Point, radius: f64, stops: &[ColorStop]) {
        self.calls.push(DrawCall::RadialGlow {
            center,
            radius,
            stops: stops.to_vec(),
        });
    }

    fn glow_dot(&mut self, center: Point, radius: f64, color: Rgba, blur: f64) {
        self.calls.push(DrawCall::GlowDot {
            center,
            radius,
            color,
            blur,
        });
    }

    fn streak(&mut self, from: Point, to: Point, head: Rgba, width: f64) {
        self.calls.push(DrawCall::Streak {
            from,
            to,
            head,
            width,
        });
    }
}
