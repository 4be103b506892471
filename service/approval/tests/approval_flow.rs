mod common;

use std::sync::Arc;

use common::{Harness, Node};
use domain_approval::{
    command::{
        ApproveCommand, AutoApproveCommand, CancelCommand, CreateStepCommand, DecideCommand,
        StartCommand,
    },
    exception::ApprovalException,
    model::{
        entity::ApprovalStep,
        vo::{
            ApprovalState, MessageKind, RecordEdit, SignMode, NODE_AUTOAPPROVAL, NODE_CANCELED,
            NODE_REVOKED,
        },
    },
    repository::{StepFilter, UpdateMode},
    service::{ApprovalService, StepLedgerService},
};
use serde_json::{json, Map};
use uuid::Uuid;

fn users<const N: usize>() -> [Uuid; N] {
    [(); N].map(|_| Uuid::new_v4())
}

async fn start(h: &Harness, record_id: Uuid, approval_id: Uuid, submitter: Uuid) {
    h.service
        .start(StartCommand {
            record_id,
            approval_id,
            submitter,
            selected_approvers: vec![],
            selected_cc_users: vec![],
        })
        .await
        .unwrap();
}

fn decision(record_id: Uuid, approver: Uuid, state: ApprovalState) -> DecideCommand {
    DecideCommand {
        record_id,
        approver,
        state,
        remark: None,
        selected_approvers: vec![],
        selected_cc_users: vec![],
        edited: None,
        use_group: None,
    }
}

fn approval_of(step: &ApprovalStep, edited: Option<RecordEdit>) -> ApproveCommand {
    ApproveCommand {
        step_id: step.id,
        approver: step.approver,
        state: ApprovalState::Approved,
        remark: None,
        sign_mode: SignMode::Or,
        cc_users: vec![],
        next_approvers: vec![],
        next_node: None,
        edited,
        expected_group_id: None,
    }
}

async fn alive_steps(h: &Harness, record_id: Uuid) -> Vec<ApprovalStep> {
    h.steps.get_alive_steps(StepFilter::record(record_id)).await.unwrap()
}

#[tokio::test]
async fn and_sign_waits_for_every_sibling() {
    let [submitter, u1, u2] = users();
    let h = Harness::new(vec![Node::new("N1", SignMode::And, &[u1, u2])]);
    let record = h.new_record();
    let approval_id = Uuid::new_v4();

    start(&h, record.id, approval_id, submitter).await;
    let steps = alive_steps(&h, record.id).await;
    assert_eq!(steps.len(), 2);
    assert!(steps
        .iter()
        .all(|s| s.state == ApprovalState::Draft && !s.is_waiting && s.node == "N1"));
    let notified: Vec<_> = h.sink.drain().into_iter().map(|m| m.to).collect();
    assert_eq!(notified, vec![u1, u2]);

    h.service
        .decide(decision(record.id, u1, ApprovalState::Approved))
        .await
        .unwrap();
    let current = h.record(record.id).await;
    assert_eq!(current.approval_state, ApprovalState::Processing);
    assert_eq!(current.approval_step_node.as_deref(), Some("N1"));

    h.service
        .decide(decision(record.id, u2, ApprovalState::Approved))
        .await
        .unwrap();
    let current = h.record(record.id).await;
    assert_eq!(current.approval_state, ApprovalState::Approved);
    assert_eq!(current.approval_last_user, Some(u2));
}

#[tokio::test]
async fn and_sign_releases_the_next_node_once_closed() {
    let [submitter, u1, u2, u3] = users();
    let h = Harness::new(vec![
        Node::new("N1", SignMode::And, &[u1, u2]),
        Node::new("N2", SignMode::And, &[u3]),
    ]);
    let record = h.new_record();
    let approval_id = Uuid::new_v4();
    start(&h, record.id, approval_id, submitter).await;
    h.sink.drain();

    // The next node's step is created ahead of time but held.
    h.service
        .decide(decision(record.id, u2, ApprovalState::Approved))
        .await
        .unwrap();
    let held = h
        .ledger
        .get_node_steps(record.id, approval_id, "N2".to_string())
        .await
        .unwrap();
    assert_eq!(held.len(), 1);
    assert!(held[0].is_waiting);
    assert!(h.sink.drain().is_empty());

    h.service
        .decide(decision(record.id, u1, ApprovalState::Approved))
        .await
        .unwrap();
    let released = h
        .ledger
        .get_node_steps(record.id, approval_id, "N2".to_string())
        .await
        .unwrap();
    assert_eq!(released.len(), 1);
    assert!(!released[0].is_waiting);
    assert_eq!(h.record(record.id).await.approval_step_node.as_deref(), Some("N2"));

    // Released and created in the same call, u3 hears about it exactly once.
    let to_u3 = h.sink.drain().into_iter().filter(|m| m.to == u3).count();
    assert_eq!(to_u3, 1);
}

#[tokio::test]
async fn or_sign_first_approval_cancels_siblings_and_advances() {
    let [submitter, u1, u2, u3] = users();
    let h = Harness::new(vec![
        Node::new("N1", SignMode::Or, &[u1, u2]),
        Node::new("N2", SignMode::And, &[u3]),
    ]);
    let record = h.new_record();
    let approval_id = Uuid::new_v4();
    start(&h, record.id, approval_id, submitter).await;
    h.sink.drain();

    h.service
        .decide(decision(record.id, u1, ApprovalState::Approved))
        .await
        .unwrap();

    let n1 = h
        .ledger
        .get_node_steps(record.id, approval_id, "N1".to_string())
        .await
        .unwrap();
    assert_eq!(n1.len(), 1);
    assert_eq!(n1[0].approver, u1);
    let all = h.steps.get_record_steps(record.id).await.unwrap();
    assert!(all.iter().any(|s| s.approver == u2 && s.is_canceled));

    let current = h.record(record.id).await;
    assert_eq!(current.approval_step_node.as_deref(), Some("N2"));
    assert_eq!(current.approval_last_user, Some(u1));
    let sent = h.sink.drain();
    assert_eq!(sent.len(), 1);
    assert_eq!((sent[0].to, sent[0].kind), (u3, MessageKind::Approve));

    let e = h
        .service
        .decide(decision(record.id, u2, ApprovalState::Approved))
        .await
        .unwrap_err();
    assert!(matches!(e, ApprovalException::NotApprover { .. }));
}

#[tokio::test]
async fn rejection_cancels_siblings_and_stops_the_instance() {
    let [submitter, u1, u2, u3] = users();
    let h = Harness::new(vec![Node::new("N1", SignMode::And, &[u1, u2, u3])]);
    let record = h.new_record();
    let approval_id = Uuid::new_v4();
    start(&h, record.id, approval_id, submitter).await;

    h.service
        .decide(decision(record.id, u1, ApprovalState::Approved))
        .await
        .unwrap();
    h.sink.drain();
    h.service
        .decide(decision(record.id, u2, ApprovalState::Rejected))
        .await
        .unwrap();

    let alive = alive_steps(&h, record.id).await;
    assert_eq!(alive.len(), 1);
    assert_eq!((alive[0].approver, alive[0].state), (u2, ApprovalState::Rejected));

    let current = h.record(record.id).await;
    assert_eq!(current.approval_state, ApprovalState::Rejected);
    assert_eq!(current.approval_last_user, Some(u2));
    let sent = h.sink.drain();
    assert!(sent
        .iter()
        .any(|m| m.to == submitter && m.kind == MessageKind::Rejected));

    let e = h
        .service
        .decide(decision(record.id, u3, ApprovalState::Approved))
        .await
        .unwrap_err();
    assert!(matches!(e, ApprovalException::InvalidState { .. }));
}

#[tokio::test]
async fn resubmit_cancels_every_alive_step_of_the_record() {
    let [submitter, u1, u2] = users();
    let h = Harness::new(vec![Node::new("N1", SignMode::And, &[u1, u2])]);
    let record = h.new_record();
    let (a1, a2) = (Uuid::new_v4(), Uuid::new_v4());

    start(&h, record.id, a1, submitter).await;
    h.service
        .cancel(CancelCommand {
            record_id: record.id,
            approval_id: None,
            current_node: None,
            actor: submitter,
        })
        .await
        .unwrap();
    assert_eq!(h.record(record.id).await.approval_state, ApprovalState::Canceled);
    let marker = alive_steps(&h, record.id)
        .await
        .into_iter()
        .find(|s| s.node == NODE_CANCELED)
        .unwrap();
    assert_eq!(marker.state, ApprovalState::Canceled);
    assert_eq!(marker.prev_node.as_deref(), Some("N1"));

    start(&h, record.id, a2, submitter).await;
    let alive = alive_steps(&h, record.id).await;
    assert_eq!(alive.len(), 2);
    assert!(alive.iter().all(|s| s.approval_id == a2));
    assert_eq!(h.record(record.id).await.approval_id, Some(a2));
}

#[tokio::test]
async fn submitter_is_stable_until_resubmit() {
    let [submitter, other, u1, u2] = users();
    let h = Harness::new(vec![
        Node::new("N1", SignMode::Or, &[u1]),
        Node::new("N2", SignMode::Or, &[u2]),
    ]);
    let record = h.new_record();
    let approval_id = Uuid::new_v4();
    start(&h, record.id, approval_id, submitter).await;

    assert_eq!(h.ledger.get_submitter(record.id, approval_id).await.unwrap(), submitter);
    h.service
        .decide(decision(record.id, u1, ApprovalState::Approved))
        .await
        .unwrap();
    assert_eq!(h.ledger.get_submitter(record.id, approval_id).await.unwrap(), submitter);

    h.service
        .decide(decision(record.id, u2, ApprovalState::Rejected))
        .await
        .unwrap();
    start(&h, record.id, approval_id, other).await;
    assert_eq!(h.ledger.get_submitter(record.id, approval_id).await.unwrap(), other);
}

#[tokio::test]
async fn auto_approve_refuses_processing_and_approved_records() {
    let [submitter, u1] = users();
    let h = Harness::new(vec![Node::new("N1", SignMode::Or, &[u1])]);

    let processing = h.new_record();
    start(&h, processing.id, Uuid::new_v4(), submitter).await;
    let refused = h
        .service
        .auto_approve(AutoApproveCommand {
            record_id: processing.id,
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(!refused);
    assert_eq!(
        h.record(processing.id).await.approval_state,
        ApprovalState::Processing
    );

    let fresh = h.new_record();
    let cmd = AutoApproveCommand {
        record_id: fresh.id,
        acting_user: Some(submitter),
        approval_id: None,
    };
    assert!(h.service.auto_approve(cmd.clone()).await.unwrap());
    let current = h.record(fresh.id).await;
    assert_eq!(current.approval_state, ApprovalState::Approved);
    assert_eq!(current.approval_step_node.as_deref(), Some(NODE_AUTOAPPROVAL));
    let marker = &alive_steps(&h, fresh.id).await[0];
    assert_eq!((marker.state, marker.approver), (ApprovalState::Approved, submitter));

    assert!(!h.service.auto_approve(cmd).await.unwrap());
}

#[tokio::test]
async fn auto_approve_again_after_revoke() {
    let h = Harness::new(vec![]);
    let record = h.new_record();
    let cmd = AutoApproveCommand {
        record_id: record.id,
        ..Default::default()
    };
    assert!(h.service.auto_approve(cmd.clone()).await.unwrap());
    h.service
        .revoke(CancelCommand {
            record_id: record.id,
            approval_id: None,
            current_node: None,
            actor: h.admin,
        })
        .await
        .unwrap();
    assert_eq!(h.record(record.id).await.approval_state, ApprovalState::Revoked);

    assert!(h.service.auto_approve(cmd).await.unwrap());
    assert_eq!(h.record(record.id).await.approval_state, ApprovalState::Approved);
}

#[tokio::test]
async fn stale_flow_keeps_the_edit_and_leaves_the_step_undecided() {
    let [submitter, u1, cfo] = users();
    let h = Harness::with_finance(
        vec![Node::new("N1", SignMode::Or, &[u1])],
        Some(Node::new("FINANCE", SignMode::Or, &[cfo])),
    );
    let record = h.new_record();
    let approval_id = Uuid::new_v4();
    start(&h, record.id, approval_id, submitter).await;

    let seen = h
        .service
        .get_next_node_candidates(record.id, approval_id, u1)
        .await
        .unwrap();
    assert!(seen.is_last_step || seen.approvers.is_empty());

    let mut fields = Map::new();
    fields.insert("amount".to_string(), json!(5000));
    let e = h
        .service
        .decide(DecideCommand {
            edited: Some(RecordEdit {
                record_id: record.id,
                fields,
            }),
            use_group: Some(seen.flow_group_id),
            ..decision(record.id, u1, ApprovalState::Approved)
        })
        .await
        .unwrap_err();
    assert!(matches!(e, ApprovalException::FlowChanged { .. }));
    assert!(e.is_no_rollback());

    assert_eq!(h.records.get_fields(record.id).await.unwrap()["amount"], json!(5000));
    let step = &alive_steps(&h, record.id).await[0];
    assert_eq!(step.state, ApprovalState::Draft);
    assert_eq!(h.record(record.id).await.approval_state, ApprovalState::Processing);

    // Deciding again against the current graph routes through finance.
    h.service
        .decide(decision(record.id, u1, ApprovalState::Approved))
        .await
        .unwrap();
    assert_eq!(h.record(record.id).await.approval_step_node.as_deref(), Some("FINANCE"));
}

#[tokio::test]
async fn normal_edits_are_refused_mid_approval() {
    let [submitter, u1] = users();
    let h = Harness::new(vec![Node::new("N1", SignMode::Or, &[u1])]);
    let record = h.new_record();
    start(&h, record.id, Uuid::new_v4(), submitter).await;

    let mut fields = Map::new();
    fields.insert("amount".to_string(), json!(1));
    let result = h
        .records
        .update_fields(
            RecordEdit {
                record_id: record.id,
                fields,
            },
            UpdateMode::Normal,
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn revoke_requires_an_admin_and_an_approved_record() {
    let [submitter, u1] = users();
    let h = Harness::new(vec![Node::new("N1", SignMode::Or, &[u1])]);
    let record = h.new_record();
    start(&h, record.id, Uuid::new_v4(), submitter).await;

    let revoke = |actor| CancelCommand {
        record_id: record.id,
        approval_id: None,
        current_node: None,
        actor,
    };
    let e = h.service.revoke(revoke(h.admin)).await.unwrap_err();
    assert!(matches!(e, ApprovalException::InvalidState { .. }));

    h.service
        .decide(decision(record.id, u1, ApprovalState::Approved))
        .await
        .unwrap();
    let e = h.service.revoke(revoke(submitter)).await.unwrap_err();
    assert!(matches!(e, ApprovalException::RevokeDenied { .. }));
    assert_eq!(h.record(record.id).await.approval_state, ApprovalState::Approved);

    h.service.revoke(revoke(h.admin)).await.unwrap();
    assert_eq!(h.record(record.id).await.approval_state, ApprovalState::Revoked);
    assert!(alive_steps(&h, record.id)
        .await
        .iter()
        .any(|s| s.node == NODE_REVOKED && s.state == ApprovalState::Revoked));
}

#[tokio::test]
async fn only_submitter_or_admin_may_cancel() {
    let [submitter, stranger, u1] = users();
    let h = Harness::new(vec![Node::new("N1", SignMode::Or, &[u1])]);
    let record = h.new_record();
    start(&h, record.id, Uuid::new_v4(), submitter).await;

    let cancel = |actor| CancelCommand {
        record_id: record.id,
        approval_id: None,
        current_node: None,
        actor,
    };
    let e = h.service.cancel(cancel(stranger)).await.unwrap_err();
    assert!(matches!(e, ApprovalException::CancelDenied { .. }));
    h.service.cancel(cancel(h.admin)).await.unwrap();
    assert_eq!(h.record(record.id).await.approval_state, ApprovalState::Canceled);
}

#[tokio::test]
async fn leftover_step_of_a_canceled_instance_cannot_approve() {
    let [submitter, u1, u2] = users();
    let h = Harness::new(vec![Node::new("N1", SignMode::Or, &[u1, u2])]);
    let record = h.new_record();
    start(&h, record.id, Uuid::new_v4(), submitter).await;
    h.service
        .cancel(CancelCommand {
            record_id: record.id,
            approval_id: None,
            current_node: None,
            actor: submitter,
        })
        .await
        .unwrap();

    let leftover = alive_steps(&h, record.id)
        .await
        .into_iter()
        .find(|s| s.approver == u1)
        .unwrap();
    let mut fields = Map::new();
    fields.insert("amount".to_string(), json!(5));
    let edit = RecordEdit {
        record_id: record.id,
        fields,
    };
    let e = h
        .service
        .approve(approval_of(&leftover, Some(edit)))
        .await
        .unwrap_err();
    assert!(matches!(
        e,
        ApprovalException::InvalidState {
            state: ApprovalState::Canceled,
            ..
        }
    ));
    assert_eq!(h.record(record.id).await.approval_state, ApprovalState::Canceled);
    assert!(!h.records.get_fields(record.id).await.unwrap().contains_key("amount"));
    let untouched = h.ledger.get_step(leftover.id).await.unwrap();
    assert_eq!(untouched.state, ApprovalState::Draft);
}

#[tokio::test]
async fn step_of_a_revoked_instance_cannot_approve() {
    let [submitter, u1, u2] = users();
    let h = Harness::new(vec![Node::new("N1", SignMode::And, &[u1])]);
    let record = h.new_record();
    let approval_id = Uuid::new_v4();
    start(&h, record.id, approval_id, submitter).await;
    h.service
        .decide(decision(record.id, u1, ApprovalState::Approved))
        .await
        .unwrap();
    h.service
        .revoke(CancelCommand {
            record_id: record.id,
            approval_id: None,
            current_node: None,
            actor: h.admin,
        })
        .await
        .unwrap();

    let late = h
        .ledger
        .create_step_if_needed(CreateStepCommand {
            record_id: record.id,
            approval_id,
            node: "N1".to_string(),
            approver: u2,
            is_waiting: false,
            prev_node: None,
            created_by: submitter,
        })
        .await
        .unwrap()
        .unwrap();
    let late = h.ledger.get_step(late).await.unwrap();
    let e = h.service.approve(approval_of(&late, None)).await.unwrap_err();
    assert!(matches!(e, ApprovalException::InvalidState { .. }));
    assert_eq!(h.record(record.id).await.approval_state, ApprovalState::Revoked);
}

#[tokio::test]
async fn concurrent_creation_of_one_key_creates_one_step() {
    let h = Harness::new(vec![]);
    let (record_id, approval_id, approver) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let ledger: Arc<dyn StepLedgerService> = h.ledger.clone();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let ledger = ledger.clone();
            tokio::spawn(async move {
                ledger
                    .create_step_if_needed(CreateStepCommand {
                        record_id,
                        approval_id,
                        node: "N1".to_string(),
                        approver,
                        is_waiting: false,
                        prev_node: None,
                        created_by: approver,
                    })
                    .await
            })
        })
        .collect();
    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().is_some() {
            created += 1;
        }
    }
    assert_eq!(created, 1);
    assert_eq!(alive_steps(&h, record_id).await.len(), 1);
}

#[tokio::test]
async fn status_and_history_follow_the_instance() {
    let [submitter, u1, u2] = users();
    let h = Harness::new(vec![
        Node::new("N1", SignMode::Or, &[u1]),
        Node::new("N2", SignMode::Or, &[u2]),
    ]);
    let record = h.new_record();
    let approval_id = Uuid::new_v4();
    start(&h, record.id, approval_id, submitter).await;

    let mine = h.service.get_approval_status(record.id, u1).await.unwrap();
    assert!(mine.im_approver);
    assert_eq!(mine.im_approve_state, Some(ApprovalState::Draft));
    assert!(!mine.can_cancel);
    let theirs = h.service.get_approval_status(record.id, submitter).await.unwrap();
    assert!(!theirs.im_approver);
    assert!(theirs.can_cancel);

    h.service
        .decide(decision(record.id, u1, ApprovalState::Approved))
        .await
        .unwrap();
    let current = h.service.get_current_step(record.id, approval_id).await.unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].approver, u2);

    let worked = h.service.get_worked_steps(record.id).await.unwrap();
    assert_eq!(worked.submitter, Some(submitter));
    let nodes: Vec<_> = worked.nodes.iter().map(|n| n.node.as_str()).collect();
    assert_eq!(nodes, vec!["N1", "N2"]);
    assert_eq!(worked.nodes[0].steps[0].state, ApprovalState::Approved);
}
