//! Static per-type declarations of cached outputs and tracked inputs.
//!
//! A work-item type builds its [`Descriptor`] once, explicitly, from its own
//! declarations plus any shared descriptor sets it embeds. Each declaration
//! stores a typed accessor, so the gate never looks attributes up by name.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// A work-item type the cache gate can reason about.
pub trait WorkItem: Sized + 'static {
    /// Whether instances cache unless the invocation turns caching off.
    const CACHES_BY_DEFAULT: bool = true;

    /// Label used in logs.
    fn name(&self) -> &str;

    /// Build the descriptor table for this type.
    fn descriptor() -> Descriptor<Self>;
}

/// Role an attribute plays for the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeRole {
    CachedOutput,
    TrackedInput,
}

/// Value of a scalar input after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Text(String),
    Path(PathBuf),
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<PathBuf> for Scalar {
    fn from(value: PathBuf) -> Self {
        Scalar::Path(value)
    }
}

type Accessor<T, V> = Arc<dyn Fn(&T) -> V + Send + Sync>;

/// Typed accessor for a tracked input, by input kind.
pub enum InputAccessor<T> {
    File(Accessor<T, Option<PathBuf>>),
    Directory(Accessor<T, Option<PathBuf>>),
    /// Members are hashed in the order the accessor returns them.
    Files(Accessor<T, Option<Vec<PathBuf>>>),
    Scalar(Accessor<T, Option<Scalar>>),
}

impl<T> Clone for InputAccessor<T> {
    fn clone(&self) -> Self {
        match self {
            InputAccessor::File(f) => InputAccessor::File(Arc::clone(f)),
            InputAccessor::Directory(f) => InputAccessor::Directory(Arc::clone(f)),
            InputAccessor::Files(f) => InputAccessor::Files(Arc::clone(f)),
            InputAccessor::Scalar(f) => InputAccessor::Scalar(Arc::clone(f)),
        }
    }
}

/// Current value of a tracked input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValue {
    File(PathBuf),
    Directory(PathBuf),
    Files(Vec<PathBuf>),
    Scalar(Scalar),
}

impl<T: 'static> InputAccessor<T> {
    /// Read the input from `item`; `None` means the value is absent.
    pub fn read(&self, item: &T) -> Option<InputValue> {
        match self {
            InputAccessor::File(f) => f(item).map(InputValue::File),
            InputAccessor::Directory(f) => f(item).map(InputValue::Directory),
            InputAccessor::Files(f) => f(item).map(InputValue::Files),
            InputAccessor::Scalar(f) => f(item).map(InputValue::Scalar),
        }
    }

    fn project<U: 'static>(self, project: fn(&U) -> &T) -> InputAccessor<U> {
        match self {
            InputAccessor::File(f) => InputAccessor::File(Arc::new(move |u: &U| f(project(u)))),
            InputAccessor::Directory(f) => {
                InputAccessor::Directory(Arc::new(move |u: &U| f(project(u))))
            }
            InputAccessor::Files(f) => InputAccessor::Files(Arc::new(move |u: &U| f(project(u)))),
            InputAccessor::Scalar(f) => InputAccessor::Scalar(Arc::new(move |u: &U| f(project(u)))),
        }
    }
}

/// A declared tracked input.
pub struct TrackedInput<T> {
    pub name: &'static str,
    /// Absent optional inputs contribute a placeholder token; absent required
    /// inputs are an error.
    pub optional: bool,
    pub accessor: InputAccessor<T>,
}

impl<T: 'static> TrackedInput<T> {
    pub fn file(
        name: &'static str,
        get: impl Fn(&T) -> Option<PathBuf> + Send + Sync + 'static,
    ) -> Self {
        Self::required(name, InputAccessor::File(Arc::new(get)))
    }

    pub fn directory(
        name: &'static str,
        get: impl Fn(&T) -> Option<PathBuf> + Send + Sync + 'static,
    ) -> Self {
        Self::required(name, InputAccessor::Directory(Arc::new(get)))
    }

    pub fn files(
        name: &'static str,
        get: impl Fn(&T) -> Option<Vec<PathBuf>> + Send + Sync + 'static,
    ) -> Self {
        Self::required(name, InputAccessor::Files(Arc::new(get)))
    }

    pub fn scalar(
        name: &'static str,
        get: impl Fn(&T) -> Option<Scalar> + Send + Sync + 'static,
    ) -> Self {
        Self::required(name, InputAccessor::Scalar(Arc::new(get)))
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn required(name: &'static str, accessor: InputAccessor<T>) -> Self {
        Self {
            name,
            optional: false,
            accessor,
        }
    }
}

impl<T> Clone for TrackedInput<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            optional: self.optional,
            accessor: self.accessor.clone(),
        }
    }
}

/// A declared cached output.
pub struct CachedOutput<T> {
    pub name: &'static str,
    accessor: Accessor<T, PathBuf>,
}

impl<T> CachedOutput<T> {
    pub fn path(&self, item: &T) -> PathBuf {
        (self.accessor)(item)
    }
}

impl<T> Clone for CachedOutput<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            accessor: Arc::clone(&self.accessor),
        }
    }
}

/// Cached outputs and tracked inputs of one work-item type, in declaration
/// order.
pub struct Descriptor<T> {
    outputs: Vec<CachedOutput<T>>,
    inputs: Vec<TrackedInput<T>>,
}

impl<T: 'static> Default for Descriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Descriptor<T> {
    pub fn new() -> Self {
        Self {
            outputs: Vec::new(),
            inputs: Vec::new(),
        }
    }

    pub fn cached_output(
        mut self,
        name: &'static str,
        get: impl Fn(&T) -> PathBuf + Send + Sync + 'static,
    ) -> Self {
        self.outputs.push(CachedOutput {
            name,
            accessor: Arc::new(get),
        });
        self
    }

    pub fn input(mut self, input: TrackedInput<T>) -> Self {
        self.inputs.push(input);
        self
    }

    /// Append every declaration of a shared set, reached through `project`.
    ///
    /// Embedded declarations follow the ones already present, in the order
    /// the shared set declares them.
    pub fn embed<S: 'static>(mut self, shared: Descriptor<S>, project: fn(&T) -> &S) -> Self {
        for output in shared.outputs {
            let get = output.accessor;
            self.outputs.push(CachedOutput {
                name: output.name,
                accessor: Arc::new(move |item: &T| get(project(item))),
            });
        }
        for input in shared.inputs {
            self.inputs.push(TrackedInput {
                name: input.name,
                optional: input.optional,
                accessor: input.accessor.project(project),
            });
        }
        self
    }

    pub fn outputs(&self) -> &[CachedOutput<T>] {
        &self.outputs
    }

    pub fn inputs(&self) -> &[TrackedInput<T>] {
        &self.inputs
    }

    /// All declared attributes with their roles, outputs first.
    pub fn attributes(&self) -> Vec<(&'static str, AttributeRole)> {
        self.outputs
            .iter()
            .map(|o| (o.name, AttributeRole::CachedOutput))
            .chain(self.inputs.iter().map(|i| (i.name, AttributeRole::TrackedInput)))
            .collect()
    }
}

impl<T> Clone for Descriptor<T> {
    fn clone(&self) -> Self {
        Self {
            outputs: self.outputs.clone(),
            inputs: self.inputs.clone(),
        }
    }
}

impl<T> fmt::Debug for Descriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field(
                "outputs",
                &self.outputs.iter().map(|o| o.name).collect::<Vec<_>>(),
            )
            .field(
                "inputs",
                &self.inputs.iter().map(|i| i.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
