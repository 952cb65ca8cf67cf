//! HTML renderer and marker encoder

use crate::{Owner, RenderError, RenderState, SlotRecord};
use isle_core::{
    ComponentNode, ElementNode, IslandId, Marker, MarkerError, MarkerKind, PartialNode, Scope, SlotNode, VNode,
};
use isle_html::{escape_attr, escape_text, is_raw_text_element, is_void_element};
use isle_serial::Value;

/// Renders virtual nodes to HTML while threading the render state.
///
/// An island gets markers and a props entry only when its nearest
/// island-or-slot owner is not an island; islands inside another island's
/// own output are plain output of that island.
#[derive(Debug, Default)]
pub struct Renderer {
    state: RenderState,
    out: String,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a tree and hand back the HTML with the accumulated state
    pub fn render_to_string(node: &VNode) -> Result<(String, RenderState), RenderError> {
        let mut renderer = Self::new();
        renderer.render(node)?;
        Ok(renderer.finish())
    }

    /// HTML of a node list rendered in a throwaway pass
    pub fn render_nodes(nodes: &[VNode]) -> Result<String, RenderError> {
        let mut renderer = Self::new();
        for node in nodes {
            renderer.render(node)?;
        }
        Ok(renderer.out)
    }

    pub fn html(&self) -> &str {
        &self.out
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn finish(self) -> (String, RenderState) {
        (self.out, self.state)
    }

    /// Render one node into the output
    pub fn render(&mut self, node: &VNode) -> Result<(), RenderError> {
        match node {
            VNode::Text(text) => self.out.push_str(&escape_text(text)),
            VNode::Element(element) => self.render_element(element)?,
            VNode::Fragment(fragment) => {
                for child in &fragment.children {
                    self.render(child)?;
                }
            }
            VNode::Component(component) => self.render_component(component)?,
            VNode::Partial(partial) => self.render_partial(partial)?,
            VNode::Slot(slot) => self.render_slot(slot)?,
            VNode::Head(nodes) => self.state.head.extend(nodes.iter().cloned()),
        }
        Ok(())
    }

    fn render_element(&mut self, element: &ElementNode) -> Result<(), RenderError> {
        self.out.push('<');
        self.out.push_str(&element.tag);
        for (name, value) in &element.attrs {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            self.out.push_str(&escape_attr(value));
            self.out.push('"');
        }
        self.out.push('>');

        if is_void_element(&element.tag) {
            return Ok(());
        }

        if is_raw_text_element(&element.tag) {
            for child in &element.children {
                if let VNode::Text(text) = child {
                    self.out.push_str(text);
                }
            }
        } else {
            for child in &element.children {
                self.render(child)?;
            }
        }

        self.out.push_str("</");
        self.out.push_str(&element.tag);
        self.out.push('>');
        Ok(())
    }

    /// Run `f` with `owner` pushed; the owner is popped on error too
    fn with_owner(
        &mut self,
        owner: Owner,
        f: impl FnOnce(&mut Self) -> Result<(), RenderError>,
    ) -> Result<(), RenderError> {
        self.state.push_owner(owner);
        let result = f(self);
        self.state.pop_owner();
        result
    }

    fn render_component(&mut self, node: &ComponentNode) -> Result<(), RenderError> {
        let component = &node.component;
        match component.island_id() {
            Some(island) if !self.state.inside_island() => self.render_island(node, island),
            Some(island) => {
                tracing::trace!(island = %island.id, "Nested island rendered without marker");
                self.with_owner(Owner::Island(island.id.clone()), |r| {
                    r.render(&component.render(&node.props, &Scope::new()))
                })
            }
            None => self.with_owner(Owner::Component(component.name().to_string()), |r| {
                r.render(&component.render(&node.props, &Scope::new()))
            }),
        }
    }

    fn render_island(&mut self, node: &ComponentNode, island: &IslandId) -> Result<(), RenderError> {
        let kind = MarkerKind::Island {
            island: island.id.clone(),
            export: island.export.clone(),
            props_index: self.state.props.len(),
            key: node.key.clone(),
        };
        let open = Marker::open(kind.clone());
        open.validate()?;

        if !is_identifier(&island.export) {
            return Err(RenderError::InvalidExport(island.export.clone()));
        }

        let props_index = self.state.push_props(Value::Object(node.props.data().clone()));
        self.state.islands.insert(island.clone());
        tracing::trace!(island = %island.id, props_index, "Rendering island");

        let mut props = node.props.clone();
        for (name, content) in node.props.slots() {
            self.state.slots.push(SlotRecord {
                props_index,
                name: name.to_string(),
            });
            props.set_slot(name, VNode::Slot(SlotNode {
                props_index,
                name: name.to_string(),
                content: Box::new(content.clone()),
            }));
        }

        self.write_marker(&open);
        self.with_owner(Owner::Island(island.id.clone()), |r| {
            r.render(&node.component.render(&props, &Scope::new()))
        })?;
        self.write_marker(&Marker::close(kind));
        Ok(())
    }

    fn render_slot(&mut self, slot: &SlotNode) -> Result<(), RenderError> {
        let kind = MarkerKind::Slot {
            props_index: slot.props_index,
            prop: slot.name.clone(),
        };
        let open = Marker::open(kind.clone());
        open.validate()?;

        self.write_marker(&open);
        let owner = Owner::Slot {
            props_index: slot.props_index,
            name: slot.name.clone(),
        };
        self.with_owner(owner, |r| r.render(&slot.content))?;
        self.write_marker(&Marker::close(kind));
        Ok(())
    }

    fn render_partial(&mut self, partial: &PartialNode) -> Result<(), RenderError> {
        let kind = MarkerKind::Partial {
            name: partial.name.clone(),
            mode: partial.mode,
            key: partial.key.clone(),
        };
        let open = Marker::open(kind.clone());
        match open.validate() {
            Err(MarkerError::InvalidName(_)) => return Err(RenderError::InvalidPartialName(partial.name.clone())),
            other => other?,
        }
        if !self.state.partial_names.insert(partial.name.clone()) {
            return Err(RenderError::DuplicatePartial(partial.name.clone()));
        }

        let start = self.out.len();
        self.write_marker(&open);
        self.state.partial_depth += 1;
        let result = partial.children.iter().try_for_each(|child| self.render(child));
        self.state.partial_depth -= 1;
        result?;
        self.write_marker(&Marker::close(kind));

        if self.state.partial_depth == 0 {
            tracing::trace!(partial = %partial.name, "Captured partial region");
            self.state.partials.insert(partial.name.clone(), self.out[start..].to_string());
        }
        Ok(())
    }

    fn write_marker(&mut self, marker: &Marker) {
        self.out.push_str("<!--");
        self.out.push_str(&marker.to_string());
        self.out.push_str("-->");
    }
}

/// Whether `name` can be written as an import binding name
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
