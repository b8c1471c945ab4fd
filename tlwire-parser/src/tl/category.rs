/// Which section of a schema file a [`super::Definition`] came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Category {
    /// A data constructor (before `---functions---`, or after `---types---`).
    #[default]
    Types,
    /// An RPC function (after `---functions---`).
    Functions,
}
