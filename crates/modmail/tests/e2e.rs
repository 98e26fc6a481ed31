// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end scenarios driving the full ticket stack through the router,
//! the way the serve loop would.

use modmail_core::types::{Attachment, Topic, UserRef};
use modmail_core::CounterStore;
use modmail_test_utils::{ARCHIVE_CHANNEL, TestHarness};

const MIB: u64 = 1024 * 1024;

/// The canonical happy path: first contact, topic selection, premature
/// staff reply, claim, both-direction conversation, close with transcript.
#[tokio::test]
async fn full_ticket_conversation_round_trip() {
    let harness = TestHarness::builder().build().await.unwrap();
    let alice = UserRef::new(1, "alice");
    let staff = UserRef::new(100, "mod");
    harness.gateway.set_profile(alice.id, "alice").await;

    // "help" with no open ticket: topic prompt.
    harness.user_dm(&alice, "help").await.unwrap();
    let dms = harness.gateway.dms_to(alice.id).await;
    assert_eq!(dms.len(), 1);
    assert!(dms[0].embed.as_ref().unwrap().title.contains("Ticket Support"));

    // Selecting "Bug Report" creates ticket #1 with a seeded log.
    harness.select_topic(&alice, Topic::BugReport).await.unwrap();
    let channel = harness.latest_channel().await.expect("ticket channel");
    let ticket = harness.registry.find_by_channel(channel).unwrap();
    assert_eq!(ticket.number.0, 1);

    // Staff reply before claiming is rejected with a notice.
    harness.staff_message(channel, &staff, "hi").await.unwrap();
    let sent = harness.gateway.channel_messages(channel).await;
    assert!(
        sent.iter().any(|m| m
            .text
            .as_deref()
            .is_some_and(|t| t.contains("claim this ticket")))
    );
    assert!(
        !harness
            .gateway
            .dms_to(alice.id)
            .await
            .iter()
            .any(|m| m.text.as_deref() == Some("hi"))
    );

    // Claim succeeds and notifies the user.
    harness.claim(channel, &staff).await.unwrap();
    assert!(
        harness
            .gateway
            .dms_to(alice.id)
            .await
            .iter()
            .any(|m| m.embed.as_ref().is_some_and(|e| e.body.contains("mod")))
    );

    // Staff question is forwarded to the user's DMs.
    harness
        .staff_message(channel, &staff, "What happened?")
        .await
        .unwrap();
    assert!(
        harness
            .gateway
            .dms_to(alice.id)
            .await
            .iter()
            .any(|m| m.text.as_deref() == Some("What happened?"))
    );

    // User answer is forwarded into the channel.
    harness.user_dm(&alice, "It crashed").await.unwrap();
    assert!(
        harness
            .gateway
            .channel_messages(channel)
            .await
            .iter()
            .any(|m| m.text.as_deref() == Some("alice: It crashed"))
    );

    // Close: transcript with exactly the three entries, both destinations,
    // channel deleted, registry empty.
    harness.close(channel, &staff).await.unwrap();

    let archived = harness.gateway.channel_messages(ARCHIVE_CHANNEL).await;
    assert_eq!(archived.len(), 1);
    let transcript = String::from_utf8(archived[0].files[0].data.clone()).unwrap();
    let lines: Vec<&str> = transcript.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Ticket #1 started with alice (1)"));
    assert!(lines[1].ends_with("Topic: Bug Report"));
    assert!(lines[2].contains("[STAFF] mod: What happened?"));
    assert!(lines[3].contains("[USER] alice: It crashed"));

    assert!(
        harness
            .gateway
            .dms_to(alice.id)
            .await
            .iter()
            .any(|m| m.files.iter().any(|f| f.filename == "Ticket-1.txt"))
    );
    assert_eq!(harness.gateway.deleted_channels().await, vec![channel]);
    assert!(harness.registry.find_by_user(alice.id).is_none());
    assert!(harness.registry.find_by_channel(channel).is_none());
}

/// A 9 MiB attachment is dropped with one notice while the co-attached
/// 1 MiB file is forwarded.
#[tokio::test]
async fn oversize_attachment_scenario() {
    let harness = TestHarness::builder().build().await.unwrap();
    let alice = UserRef::new(1, "alice");
    let channel = harness.open_ticket(&alice, Topic::InGameReport).await.unwrap();
    harness.gateway.clear_ops().await;

    harness
        .user_dm_with_attachments(
            &alice,
            "evidence",
            vec![
                Attachment {
                    filename: "clip.mp4".into(),
                    size_bytes: 9 * MIB,
                    url: "https://cdn.example/clip.mp4".into(),
                },
                Attachment {
                    filename: "shot.png".into(),
                    size_bytes: MIB,
                    url: "https://cdn.example/shot.png".into(),
                },
            ],
        )
        .await
        .unwrap();

    let forwarded = harness.gateway.channel_messages(channel).await;
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0].forward_attachments.len(), 1);
    assert_eq!(forwarded[0].forward_attachments[0].filename, "shot.png");

    let notices: Vec<_> = harness
        .gateway
        .dms_to(alice.id)
        .await
        .into_iter()
        .filter(|m| {
            m.text
                .as_deref()
                .is_some_and(|t| t.contains("too large"))
        })
        .collect();
    assert_eq!(notices.len(), 1, "exactly one oversize notice per message");
}

/// Ticket numbers stay strictly increasing across interleaved creations and
/// closures, and a user can reopen after closing.
#[tokio::test]
async fn ticket_numbers_increase_across_creations_and_closures() {
    let harness = TestHarness::builder().build().await.unwrap();
    let staff = UserRef::new(100, "mod");

    let mut numbers = Vec::new();
    for round in 0..3u64 {
        for user_id in [1u64, 2] {
            let user = UserRef::new(user_id, format!("user-{user_id}"));
            let channel = harness.open_ticket(&user, Topic::Other).await.unwrap();
            let ticket = harness.registry.find_by_channel(channel).unwrap();
            numbers.push(ticket.number.0);
            harness.close(channel, &staff).await.unwrap();
        }
        assert_eq!(harness.registry.open_count(), 0, "round {round} left tickets");
    }

    let mut sorted = numbers.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), numbers.len(), "numbers must never repeat");
    assert_eq!(numbers, sorted, "numbers must be strictly increasing");
    assert_eq!(harness.counter.last_issued().await.unwrap(), 6);
}

/// Concurrent first-contact DMs from one user produce a single prompt.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_contact_yields_one_prompt() {
    let harness = std::sync::Arc::new(TestHarness::builder().build().await.unwrap());
    let alice = UserRef::new(1, "alice");

    let mut handles = Vec::new();
    for i in 0..8 {
        let harness = harness.clone();
        let alice = alice.clone();
        handles.push(tokio::spawn(async move {
            harness.user_dm(&alice, &format!("hello {i}")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let prompts: Vec<_> = harness
        .gateway
        .dms_to(alice.id)
        .await
        .into_iter()
        .filter(|m| {
            m.embed
                .as_ref()
                .is_some_and(|e| e.title.contains("Ticket Support"))
        })
        .collect();
    assert_eq!(prompts.len(), 1, "exactly one topic prompt may be sent");
}
