use std::collections::BTreeSet;

use crate::document::{Document, NodeId};

/// Swap every marker under `root` back to a text node with its original text.
///
/// Markers are independent, so order does not matter. Returns how many were
/// restored; zero markers is not an error.
pub fn restore_original_text(doc: &mut Document, root: NodeId, normalize: bool) -> usize {
    let markers = doc.markers(root);
    if markers.is_empty() {
        return 0;
    }

    let mut parents = BTreeSet::new();
    let mut restored = 0;

    for marker in markers {
        let Some(original) = doc.annotation(marker).map(|m| m.original.clone()) else {
            continue;
        };
        let Some(parent) = doc.parent(marker) else {
            continue;
        };

        let text = doc.create_text(original);
        match doc.replace(marker, text).and_then(|()| doc.release(marker)) {
            Ok(_) => {
                parents.insert(parent);
                restored += 1;
            }
            Err(e) => tracing::warn!("Failed to restore marker {}: {}", marker, e),
        }
    }

    if normalize {
        for parent in parents {
            if let Err(e) = doc.normalize_shallow(parent) {
                tracing::warn!("Failed to normalize {}: {}", parent, e);
            }
        }
    }

    tracing::debug!("Restored {} markers", restored);
    restored
}
