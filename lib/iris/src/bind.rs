use crate::context::GraphicsContext;

/// An object that occupies one of the graphics context's global binding slots while bound.
pub trait Bind {
    type Id: Copy;

    fn id(&self) -> Self::Id;
    fn bind<Gc: GraphicsContext>(&self, gc: &Gc);
    /// Empty the slot this object binds to, whatever it currently holds.
    fn unbind<Gc: GraphicsContext>(&self, gc: &Gc);
    fn is_bound<Gc: GraphicsContext>(&self, gc: &Gc) -> bool;
}
