// Implemented by owners of glib sources, which outlive their owner unless removed explicitly.
pub trait Destroyable {
    fn destroy(&mut self);
}
