use super::handle::Handle;

/// Node color for the red-black balancing scheme.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// A red-black tree node.
///
/// Every structural link is a plain [`Handle`]; "no child" and "no parent" are
/// both [`Handle::NIL`], the shared sentinel, so link reads never branch on an
/// `Option`. The parent link is a non-owning back-reference used only for
/// upward walks and rotation bookkeeping.
///
/// The payload is `None` only for the sentinel, which also keeps a fixed
/// `Black` color and the aggregate's identity value for its whole lifetime.
#[derive(Clone)]
pub(crate) struct Node<P, A> {
    payload: Option<P>,
    color: Color,
    pub(crate) left: Handle,
    pub(crate) right: Handle,
    pub(crate) parent: Handle,
    pub(crate) aug: A,
}

impl<P, A> Node<P, A> {
    /// Creates the sentinel node: black, self-linked, identity aggregate.
    pub(crate) fn sentinel(identity: A) -> Self {
        Self {
            payload: None,
            color: Color::Black,
            left: Handle::NIL,
            right: Handle::NIL,
            parent: Handle::NIL,
            aug: identity,
        }
    }

    /// Creates a freshly inserted node: red, all links to the sentinel.
    pub(crate) fn new(payload: P, identity: A) -> Self {
        Self {
            payload: Some(payload),
            color: Color::Red,
            left: Handle::NIL,
            right: Handle::NIL,
            parent: Handle::NIL,
            aug: identity,
        }
    }

    /// Returns the payload, panicking on the sentinel.
    #[inline]
    pub(crate) fn payload(&self) -> &P {
        self.payload.as_ref().expect("`Node::payload()` - the sentinel has no payload!")
    }

    /// Takes the payload out of a detached node.
    pub(crate) fn into_payload(self) -> P {
        self.payload.expect("`Node::into_payload()` - the sentinel has no payload!")
    }

    #[inline]
    pub(crate) fn color(&self) -> Color {
        self.color
    }

    /// Recolors the node. The sentinel must stay black; the engine never
    /// calls this on it.
    #[inline]
    pub(crate) fn set_color(&mut self, color: Color) {
        debug_assert!(self.payload.is_some() || color == Color::Black);
        self.color = color;
    }
}
