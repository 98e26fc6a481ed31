// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment forwarding policy.
//!
//! Each attachment is forwarded only if its size is at or under the
//! configured threshold; oversized attachments are dropped, and the sender
//! gets a single notice per message if any were dropped.

use modmail_core::types::Attachment;

/// Notice emitted once per message when at least one attachment was dropped.
pub const OVERSIZE_NOTICE: &str = "Some files were too large and could not be forwarded.";

/// Outcome of applying the size policy to one message's attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentSplit {
    /// Attachments at or under the threshold, in original order.
    pub forward: Vec<Attachment>,
    /// How many were dropped for being oversized.
    pub dropped: usize,
}

/// Partitions a message's attachments by the size threshold.
pub fn partition(attachments: &[Attachment], max_bytes: u64) -> AttachmentSplit {
    let forward: Vec<Attachment> = attachments
        .iter()
        .filter(|a| a.size_bytes <= max_bytes)
        .cloned()
        .collect();
    let dropped = attachments.len() - forward.len();
    AttachmentSplit { forward, dropped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(name: &str, size_bytes: u64) -> Attachment {
        Attachment {
            filename: name.into(),
            size_bytes,
            url: format!("https://cdn.example/{name}"),
        }
    }

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn under_threshold_forwards_all() {
        let split = partition(&[attachment("a.png", MIB), attachment("b.png", 2 * MIB)], 8 * MIB);
        assert_eq!(split.forward.len(), 2);
        assert_eq!(split.dropped, 0);
    }

    #[test]
    fn oversized_is_dropped_and_counted() {
        let split = partition(
            &[attachment("big.bin", 9 * MIB), attachment("small.png", MIB)],
            8 * MIB,
        );
        assert_eq!(split.forward.len(), 1);
        assert_eq!(split.forward[0].filename, "small.png");
        assert_eq!(split.dropped, 1);
    }

    #[test]
    fn exactly_at_threshold_is_forwarded() {
        let split = partition(&[attachment("edge.bin", 8 * MIB)], 8 * MIB);
        assert_eq!(split.forward.len(), 1);
        assert_eq!(split.dropped, 0);
    }

    #[test]
    fn order_is_preserved() {
        let split = partition(
            &[
                attachment("1.png", MIB),
                attachment("2.png", 20 * MIB),
                attachment("3.png", MIB),
            ],
            8 * MIB,
        );
        let names: Vec<&str> = split.forward.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, ["1.png", "3.png"]);
        assert_eq!(split.dropped, 1);
    }
}
