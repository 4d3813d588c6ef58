//! # Action Renderer
//!
//! Walks a markup tree and produces [`PrinterAction`]s.
//!
//! ## Style Frames
//!
//! Each styled node renders inside its own frame:
//!
//! ```text
//! <b>x<center>y</center></b>     (inherited frame F0)
//!
//! SetStyle(F1 = F0 + bold)
//!   EmitText("x")
//!   SetStyle(F2 = F1 + center)
//!     EmitText("y")
//!     EmitText("\n")            alignment forces a line break
//!   SetStyle(F1)                restore
//! SetStyle(F0)                  restore
//! ```
//!
//! Frames are passed by value down the recursion, so every `SetStyle` on the
//! way in has a matching restore on the way out.

use super::parser::Node;
use crate::action::PrinterAction;
use crate::style::Style;

/// Render one node under `inherited`.
///
/// Returns the actions and the style in effect once they have been replayed,
/// which is always `inherited` itself.
pub fn render(node: &Node, inherited: &Style) -> (Vec<PrinterAction>, Style) {
    let mut actions = Vec::new();
    render_into(node, inherited, &mut actions);
    (actions, *inherited)
}

fn render_into(node: &Node, inherited: &Style, out: &mut Vec<PrinterAction>) {
    match node {
        Node::Text(text) => out.push(PrinterAction::text(text.as_str())),
        Node::Styled(styled) => {
            let name = styled.tag.name;
            let overrides = &styled.tag.overrides;
            let frame = inherited.overlay(overrides);

            out.push(PrinterAction::set_style(format!("set {}", name), frame));
            for child in &styled.children {
                render_into(child, &frame, out);
            }
            if overrides.sets_align() {
                out.push(PrinterAction::newline());
            }
            out.push(PrinterAction::set_style(format!("reset {}", name), *inherited));
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
