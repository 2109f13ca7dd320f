//! Integration tests for synchronized writes
//!
//! These tests run against a throwaway PostgreSQL container and a
//! recording platform double, covering the rollback and rejection
//! behavior of the repositories end to end.
//!
//! All tests are ignored by default; run them with
//! `cargo test -p test_utils -- --ignored` on a machine with Docker.

use core_kernel::ports::GatewayError;
use infra_db::{
    CampaignRepository, CriteriaRepository, MemberRepository, MessageRepository,
    SegmentRepository, SyncError,
};
use test_utils::{
    create_isolated_test_database, MockPlatform, TestCampaignBuilder, TestCriteriaBuilder,
    TestMemberBuilder, TestMessageBuilder, TestSegmentBuilder,
};

async fn row_count(pool: &sqlx::PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn test_message_save_persists_remote_id() {
    let db = create_isolated_test_database().await.unwrap();
    let platform = MockPlatform::new();
    let repo = MessageRepository::new(db.pool().clone());

    let mut message = TestMessageBuilder::new().build();
    repo.save(&mut message, &platform).await.unwrap();

    assert!(message.remote_id.is_some());

    let reloaded = repo.find(message.id).await.unwrap();
    assert_eq!(reloaded.remote_id, message.remote_id);
    assert_eq!(platform.count_calls("create_message"), 1);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn test_remote_failure_rolls_back_local_write() {
    let db = create_isolated_test_database().await.unwrap();
    let platform = MockPlatform::new();
    platform.set_failing(true);
    let repo = MessageRepository::new(db.pool().clone());

    let mut message = TestMessageBuilder::new().build();
    let error = repo.save(&mut message, &platform).await.unwrap_err();

    assert!(matches!(error, SyncError::Gateway(_)));
    assert_eq!(row_count(db.pool(), "messages").await, 0);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn test_unsupported_delete_keeps_local_row() {
    let db = create_isolated_test_database().await.unwrap();
    let platform = MockPlatform::new();
    let repo = SegmentRepository::new(db.pool().clone());

    let mut segment = TestSegmentBuilder::new().build();
    repo.save(&mut segment, &platform).await.unwrap();

    let error = repo.delete(&segment, &platform).await.unwrap_err();
    match error {
        SyncError::Gateway(e) => assert!(e.is_rejected()),
        other => panic!("expected gateway rejection, got {other}"),
    }

    assert_eq!(row_count(db.pool(), "segments").await, 1);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn test_message_delete_rejected_even_when_referenced() {
    let db = create_isolated_test_database().await.unwrap();
    let platform = MockPlatform::new();
    let messages = MessageRepository::new(db.pool().clone());
    let segments = SegmentRepository::new(db.pool().clone());
    let campaigns = CampaignRepository::new(db.pool().clone());

    let mut message = TestMessageBuilder::new().build();
    messages.save(&mut message, &platform).await.unwrap();
    let mut segment = TestSegmentBuilder::new().build();
    segments.save(&mut segment, &platform).await.unwrap();

    // A campaign holds a foreign key onto the message; the rejection must
    // come from the platform, not from the referencing row.
    let mut campaign = TestCampaignBuilder::new()
        .for_message(&message)
        .for_segment(&segment)
        .build();
    campaigns.save(&mut campaign, &platform).await.unwrap();

    let error = messages.delete(&message, &platform).await.unwrap_err();
    match error {
        SyncError::Gateway(e) => assert!(e.is_rejected()),
        other => panic!("expected gateway rejection, got {other}"),
    }

    assert_eq!(row_count(db.pool(), "messages").await, 1);
    assert_eq!(row_count(db.pool(), "campaigns").await, 1);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn test_criteria_deletes_rejected_with_rows_intact() {
    let db = create_isolated_test_database().await.unwrap();
    let platform = MockPlatform::new();
    let segments = SegmentRepository::new(db.pool().clone());
    let criteria_repo = CriteriaRepository::new(db.pool().clone());

    let mut segment = TestSegmentBuilder::new().build();
    segments.save(&mut segment, &platform).await.unwrap();

    let string_criteria = TestCriteriaBuilder::new().for_segment(&segment).build();
    criteria_repo
        .save_string(&string_criteria, &platform)
        .await
        .unwrap();
    let numeric_criteria = TestCriteriaBuilder::new()
        .for_segment(&segment)
        .build_numeric();
    criteria_repo
        .save_numeric(&numeric_criteria, &platform)
        .await
        .unwrap();

    let error = criteria_repo
        .delete_string(&string_criteria, &platform)
        .await
        .unwrap_err();
    match error {
        SyncError::Gateway(e) => assert!(e.is_rejected()),
        other => panic!("expected gateway rejection, got {other}"),
    }

    let error = criteria_repo
        .delete_numeric(&numeric_criteria, &platform)
        .await
        .unwrap_err();
    match error {
        SyncError::Gateway(e) => assert!(e.is_rejected()),
        other => panic!("expected gateway rejection, got {other}"),
    }

    assert_eq!(row_count(db.pool(), "string_criteria").await, 1);
    assert_eq!(row_count(db.pool(), "numeric_criteria").await, 1);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn test_member_delete_deactivates_and_resyncs() {
    let db = create_isolated_test_database().await.unwrap();
    let platform = MockPlatform::new();
    let repo = MemberRepository::new(db.pool().clone());

    let mut member = TestMemberBuilder::new().build();
    repo.save(&member, &platform).await.unwrap();
    repo.delete(&mut member, &platform).await.unwrap();

    // Deletion is logical: the row stays, deactivated.
    assert_eq!(row_count(db.pool(), "members").await, 1);

    let reloaded = repo.find(member.id).await.unwrap();
    assert!(!reloaded.is_active);
    assert_eq!(platform.count_calls("upsert_member"), 2);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn test_criteria_save_requires_synchronized_segment() {
    let db = create_isolated_test_database().await.unwrap();
    let platform = MockPlatform::new();
    let segments = SegmentRepository::new(db.pool().clone());
    let criteria_repo = CriteriaRepository::new(db.pool().clone());

    let mut segment = TestSegmentBuilder::new().build();
    segments.save(&mut segment, &platform).await.unwrap();

    let criteria = TestCriteriaBuilder::new().for_segment(&segment).build();
    criteria_repo.save_string(&criteria, &platform).await.unwrap();

    // The request must carry the segment's remote id, never the local one.
    let request = platform.requests().pop().unwrap();
    assert_eq!(
        request.to_json()["id"],
        serde_json::json!(segment.remote_id.unwrap().value())
    );
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn test_campaign_create_and_post_flow() {
    let db = create_isolated_test_database().await.unwrap();
    let platform = MockPlatform::new();
    let messages = MessageRepository::new(db.pool().clone());
    let segments = SegmentRepository::new(db.pool().clone());
    let campaigns = CampaignRepository::new(db.pool().clone());

    let mut message = TestMessageBuilder::new().build();
    messages.save(&mut message, &platform).await.unwrap();

    let mut segment = TestSegmentBuilder::new().build();
    segments.save(&mut segment, &platform).await.unwrap();

    let mut campaign = TestCampaignBuilder::new()
        .for_message(&message)
        .for_segment(&segment)
        .build();
    campaigns.save(&mut campaign, &platform).await.unwrap();
    campaigns.post(&campaign, &platform).await.unwrap();

    let reloaded = campaigns.find(campaign.id).await.unwrap();
    assert_eq!(reloaded.remote_id, campaign.remote_id);
    assert_eq!(reloaded.message.remote_id, message.remote_id);
    assert_eq!(platform.count_calls("post_campaign"), 1);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn test_rejected_post_surfaces_as_rejection() {
    let db = create_isolated_test_database().await.unwrap();
    let platform = MockPlatform::new();
    let messages = MessageRepository::new(db.pool().clone());
    let segments = SegmentRepository::new(db.pool().clone());
    let campaigns = CampaignRepository::new(db.pool().clone());

    let mut message = TestMessageBuilder::new().build();
    messages.save(&mut message, &platform).await.unwrap();
    let mut segment = TestSegmentBuilder::new().build();
    segments.save(&mut segment, &platform).await.unwrap();

    let mut campaign = TestCampaignBuilder::new()
        .for_message(&message)
        .for_segment(&segment)
        .build();
    campaigns.save(&mut campaign, &platform).await.unwrap();

    platform.set_rejecting_posts(true);
    let error = campaigns.post(&campaign, &platform).await.unwrap_err();

    match error {
        SyncError::Gateway(GatewayError::Rejected { operation, .. }) => {
            assert_eq!(operation, "postCampaign");
        }
        other => panic!("expected rejection, got {other}"),
    }
}
