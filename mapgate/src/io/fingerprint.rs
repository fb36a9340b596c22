//! Fingerprint calculation for one cached output of a work item.

use tracing::{debug, instrument};

use crate::core::descriptor::{CachedOutput, InputValue, Scalar, TrackedInput};
use crate::core::fingerprint::Fingerprint;
use crate::error::GateError;
use crate::io::hash::{hash_dir_recursive, hash_dir_shallow, hash_file, hash_path_all, hash_str};

/// Compute the fingerprint of `output` against every tracked input.
///
/// The output's own content comes first so tampering with an output is
/// detected even when no input changed. Inputs follow in declared order.
#[instrument(skip_all, fields(output = output.name))]
pub fn fingerprint<T: 'static>(
    output: &CachedOutput<T>,
    inputs: &[TrackedInput<T>],
    item: &T,
) -> Result<Fingerprint, GateError> {
    let mut fingerprint = Fingerprint::new();
    let output_path = output.path(item);
    fingerprint.extend(hash_path_all(&output_path)?);

    for input in inputs {
        let before = fingerprint.len();
        match input.accessor.read(item) {
            None if input.optional => fingerprint.push_absent(),
            None => return Err(GateError::MissingInput { name: input.name }),
            Some(InputValue::File(path)) => fingerprint.push(hash_file(&path)?),
            Some(InputValue::Directory(dir)) => fingerprint.extend(hash_dir_recursive(&dir)?),
            Some(InputValue::Files(files)) => {
                for path in &files {
                    fingerprint.push(hash_file(path)?);
                }
            }
            Some(InputValue::Scalar(Scalar::Text(text))) => fingerprint.push(hash_str(&text)),
            Some(InputValue::Scalar(Scalar::Path(path))) => {
                if path.is_dir() {
                    fingerprint.extend(hash_dir_shallow(&path)?);
                } else {
                    fingerprint.push(hash_file(&path)?);
                }
            }
        }
        debug!(
            input = input.name,
            tokens = %fingerprint.tokens()[before..].join(","),
            "hashed input"
        );
    }
    Ok(fingerprint)
}
