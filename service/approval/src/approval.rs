use std::sync::Arc;

use async_trait::async_trait;
use domain_approval::{
    command::{
        ApproveCommand, AutoApproveCommand, CancelCommand, CancelStepsCommand, CreateStepCommand,
        DecideCommand, StartCommand, SubmitCommand,
    },
    exception::{ApprovalException, ApprovalResult},
    model::{
        entity::{ApprovalRecord, ApprovalStep},
        vo::{
            ApprovalMessage, ApprovalState, ApprovalStatusView, CurrentStep, FlowDefinitionRef,
            NextNodeCandidates, RecordEdit, SignMode, StepView, WorkedNode, WorkedSteps,
            APPROVAL_NOID, NODE_AUTOAPPROVAL, NODE_CANCELED, NODE_REVOKED, NODE_ROOT, SYSTEM_USER,
        },
    },
    repository::UpdateMode,
    service::{
        ApprovalService, FlowDefinitionResolver, NotificationSink, RecordMutatorService,
        StepLedgerService, UserPrivilegeService,
    },
};
use uuid::Uuid;

#[derive(typed_builder::TypedBuilder)]
pub struct ApprovalServiceImpl {
    ledger: Arc<dyn StepLedgerService>,
    record_mutator: Arc<dyn RecordMutatorService>,
    flow_resolver: Arc<dyn FlowDefinitionResolver>,
    notification_sink: Arc<dyn NotificationSink>,
    privilege_service: Arc<dyn UserPrivilegeService>,
}

impl ApprovalServiceImpl {
    /// Deliver messages once the state they describe is persisted. Failures never reach the caller.
    async fn notify_all(&self, outbox: Vec<ApprovalMessage>) {
        for msg in outbox {
            let to = msg.to;
            if let Err(e) = self.notification_sink.send(msg).await {
                tracing::warn!("Failed to notify user: {to}, {e}");
            }
        }
    }

    async fn current_steps(&self, record: &ApprovalRecord) -> ApprovalResult<Vec<CurrentStep>> {
        let (Some(approval_id), Some(node)) = (record.approval_id, &record.approval_step_node)
        else {
            return Ok(vec![]);
        };
        let steps = self
            .ledger
            .get_node_steps(record.id, approval_id, node.to_owned())
            .await?;
        Ok(steps.iter().map(CurrentStep::from).collect())
    }

    async fn processing_record(&self, record_id: Uuid) -> ApprovalResult<ApprovalRecord> {
        let record = self.record_mutator.get_record(record_id).await?;
        if record.approval_state != ApprovalState::Processing {
            return Err(ApprovalException::InvalidState {
                record_id,
                state: record.approval_state,
            });
        }
        Ok(record)
    }

    /// Write the marker step of a cancel or revoke.
    async fn settle_instance(
        &self,
        record: &ApprovalRecord,
        cmd: &CancelCommand,
        node: &str,
        state: ApprovalState,
    ) -> ApprovalResult<()> {
        let approval_id = cmd.approval_id.or(record.approval_id).unwrap_or(APPROVAL_NOID);
        let current_node = cmd
            .current_node
            .clone()
            .or_else(|| record.approval_step_node.clone())
            .unwrap_or_else(|| NODE_ROOT.to_string());
        self.ledger
            .create_settled_step(
                CreateStepCommand {
                    record_id: record.id,
                    approval_id,
                    node: node.to_string(),
                    approver: cmd.actor,
                    is_waiting: false,
                    prev_node: Some(current_node),
                    created_by: cmd.actor,
                },
                state,
                None,
            )
            .await?;
        Ok(())
    }
}

fn distinct(users: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(users.len());
    for user in users {
        if !seen.contains(&user) {
            seen.push(user);
        }
    }
    seen
}

#[async_trait]
impl ApprovalService for ApprovalServiceImpl {
    async fn submit(&self, cmd: SubmitCommand) -> ApprovalResult<()> {
        let SubmitCommand {
            record_id,
            approval_id,
            submitter,
            node,
            approvers,
            cc_users,
        } = cmd;
        if approvers.is_empty() {
            return Err(ApprovalException::NoApprovers);
        }
        let record = self.record_mutator.get_record(record_id).await?;
        if matches!(
            record.approval_state,
            ApprovalState::Processing | ApprovalState::Approved
        ) {
            return Err(ApprovalException::InvalidState {
                record_id,
                state: record.approval_state,
            });
        }

        // Whatever is still alive on the record, from any instance, is superseded.
        self.ledger
            .cancel_alive_steps(CancelStepsCommand {
                record_id,
                ..Default::default()
            })
            .await?;
        self.record_mutator
            .set_processing(record_id, approval_id, node.to_owned())
            .await?;

        let mut outbox = vec![];
        for approver in distinct(approvers) {
            let created = self
                .ledger
                .create_step_if_needed(CreateStepCommand {
                    record_id,
                    approval_id,
                    node: node.to_owned(),
                    approver,
                    is_waiting: false,
                    prev_node: Some(NODE_ROOT.to_string()),
                    created_by: submitter,
                })
                .await?;
            if created.is_some() {
                outbox.push(ApprovalMessage::approve(approver, record_id, &record.entity));
            }
        }
        for cc in distinct(cc_users) {
            outbox.push(ApprovalMessage::submitted_cc(
                cc,
                record_id,
                &record.entity,
                submitter,
            ));
        }
        self.ledger.evict_submitter(record_id, approval_id);

        tracing::info!("Record: {record_id} submitted into approval: {approval_id}, node: {node}");
        self.notify_all(outbox).await;
        Ok(())
    }

    async fn start(&self, cmd: StartCommand) -> ApprovalResult<()> {
        let StartCommand {
            record_id,
            approval_id,
            submitter,
            selected_approvers,
            selected_cc_users,
        } = cmd;
        let group = self
            .flow_resolver
            .get_next_nodes(record_id, approval_id, NODE_ROOT.to_string(), submitter)
            .await?;
        let node = group
            .node
            .clone()
            .ok_or(ApprovalException::NoSuchFlow { approval_id })?;
        let approvers = group.approvers_with(&selected_approvers);
        if approvers.is_empty() {
            return Err(ApprovalException::NoApprovers);
        }
        self.submit(SubmitCommand {
            record_id,
            approval_id,
            submitter,
            node,
            approvers,
            cc_users: group.cc_users_with(&selected_cc_users),
        })
        .await
    }

    async fn approve(&self, cmd: ApproveCommand) -> ApprovalResult<()> {
        let ApproveCommand {
            step_id,
            approver,
            state,
            remark,
            sign_mode,
            cc_users,
            next_approvers,
            next_node,
            edited,
            expected_group_id,
        } = cmd;
        if !state.is_decision() {
            return Err(ApprovalException::InvalidDecision { state });
        }
        let step = self.ledger.get_step(step_id).await?;
        if !step.is_actionable() {
            return Err(ApprovalException::StepNotActionable { step_id });
        }
        let ApprovalStep {
            record_id,
            approval_id,
            node: current_node,
            ..
        } = step;
        let record = self.record_mutator.get_record(record_id).await?;
        if record.approval_state != ApprovalState::Processing
            || record.approval_id != Some(approval_id)
        {
            return Err(ApprovalException::InvalidState {
                record_id,
                state: record.approval_state,
            });
        }

        if let Some(edit) = edited.filter(|e| !e.is_empty()) {
            self.record_mutator
                .apply_edit(
                    RecordEdit {
                        record_id,
                        ..edit
                    },
                    UpdateMode::Force,
                )
                .await?;
            if let Some(expected) = expected_group_id {
                let group = self
                    .flow_resolver
                    .get_next_nodes(record_id, approval_id, current_node.to_owned(), approver)
                    .await?;
                if group.group_id != expected {
                    // The edit stays; only the decision is refused.
                    tracing::warn!(
                        "Flow of record: {record_id} changed after edit, expected group: {expected}, resolved: {}",
                        group.group_id
                    );
                    return Err(ApprovalException::FlowChanged {
                        expected,
                        resolved: group.group_id,
                    });
                }
            }
        }

        self.ledger.decide(step_id, state, remark).await?;

        let submitter = self.ledger.get_submitter(record_id, approval_id).await?;
        let mut outbox: Vec<ApprovalMessage> = distinct(cc_users)
            .into_iter()
            .map(|cc| {
                ApprovalMessage::decided_cc(
                    cc,
                    record_id,
                    &record.entity,
                    submitter,
                    approver,
                    state.label(),
                )
            })
            .collect();

        if state == ApprovalState::Rejected {
            self.ledger
                .cancel_alive_steps(CancelStepsCommand {
                    record_id,
                    approval_id: Some(approval_id),
                    node: Some(current_node.to_owned()),
                    exclude_step: Some(step_id),
                    only_draft: false,
                })
                .await?;
            self.record_mutator
                .mark_state(record_id, ApprovalState::Rejected, Some(approver))
                .await?;
            outbox.push(ApprovalMessage::rejected(
                submitter,
                record_id,
                &record.entity,
                approver,
            ));
            tracing::info!("Record: {record_id} rejected by: {approver} at node: {current_node}");
            self.notify_all(outbox).await;
            return Ok(());
        }

        let go_next_node = match sign_mode {
            SignMode::Or => {
                self.ledger
                    .cancel_alive_steps(CancelStepsCommand {
                        record_id,
                        approval_id: Some(approval_id),
                        node: Some(current_node.to_owned()),
                        exclude_step: Some(step_id),
                        only_draft: false,
                    })
                    .await?;
                true
            }
            SignMode::And => {
                let siblings = self
                    .ledger
                    .get_node_steps(record_id, approval_id, current_node.to_owned())
                    .await?;
                let closed = siblings
                    .iter()
                    .all(|s| s.id == step_id || s.state != ApprovalState::Draft);
                if closed {
                    if let Some(next) = &next_node {
                        let released = self
                            .ledger
                            .release_waiting_steps(record_id, approval_id, next.to_owned())
                            .await?;
                        outbox.extend(released.iter().map(|s| {
                            ApprovalMessage::approve(s.approver, record_id, &record.entity)
                        }));
                    }
                }
                closed
            }
        };

        let next_node = match next_node {
            Some(next) if !next_approvers.is_empty() => next,
            _ => {
                if go_next_node {
                    self.record_mutator
                        .approve(record_id, ApprovalState::Approved, Some(approver))
                        .await?;
                    tracing::info!("Record: {record_id} approved, last approver: {approver}");
                }
                self.notify_all(outbox).await;
                return Ok(());
            }
        };

        if go_next_node {
            self.record_mutator
                .advance_node(record_id, next_node.to_owned(), approver)
                .await?;
            tracing::info!("Record: {record_id} advanced from node: {current_node} to: {next_node}");
        }
        for next_approver in distinct(next_approvers) {
            let created = self
                .ledger
                .create_step_if_needed(CreateStepCommand {
                    record_id,
                    approval_id,
                    node: next_node.to_owned(),
                    approver: next_approver,
                    is_waiting: !go_next_node,
                    prev_node: Some(current_node.to_owned()),
                    created_by: approver,
                })
                .await?;
            if go_next_node && created.is_some() {
                outbox.push(ApprovalMessage::approve(
                    next_approver,
                    record_id,
                    &record.entity,
                ));
            }
        }
        self.notify_all(outbox).await;
        Ok(())
    }

    async fn decide(&self, cmd: DecideCommand) -> ApprovalResult<()> {
        let DecideCommand {
            record_id,
            approver,
            state,
            remark,
            selected_approvers,
            selected_cc_users,
            edited,
            use_group,
        } = cmd;
        if !state.is_decision() {
            return Err(ApprovalException::InvalidDecision { state });
        }
        let record = self.processing_record(record_id).await?;
        let (Some(approval_id), Some(current_node)) =
            (record.approval_id, record.approval_step_node.clone())
        else {
            return Err(ApprovalException::InvalidState {
                record_id,
                state: record.approval_state,
            });
        };

        let step = self
            .ledger
            .get_node_steps(record_id, approval_id, current_node.to_owned())
            .await?
            .into_iter()
            .find(|s| s.approver == approver && s.is_actionable())
            .ok_or(ApprovalException::NotApprover {
                record_id,
                user: approver,
            })?;
        let node_info = self
            .flow_resolver
            .get_current_node(record_id, approval_id, current_node.to_owned())
            .await?;

        let (next_node, next_approvers, cc_users) = if state == ApprovalState::Rejected {
            (None, vec![], selected_cc_users)
        } else {
            let group = self
                .flow_resolver
                .get_next_nodes(record_id, approval_id, current_node, approver)
                .await?;
            let approvers = group.approvers_with(&selected_approvers);
            if !group.is_empty() && approvers.is_empty() {
                return Err(ApprovalException::NoApprovers);
            }
            let cc_users = group.cc_users_with(&selected_cc_users);
            (group.node, approvers, cc_users)
        };

        self.approve(ApproveCommand {
            step_id: step.id,
            approver,
            state,
            remark,
            sign_mode: node_info.sign_mode,
            cc_users,
            next_approvers,
            next_node,
            edited,
            expected_group_id: use_group,
        })
        .await
    }

    async fn cancel(&self, cmd: CancelCommand) -> ApprovalResult<()> {
        let record = self.processing_record(cmd.record_id).await?;
        if !self.privilege_service.is_admin(cmd.actor).await? {
            let approval_id = cmd.approval_id.or(record.approval_id).unwrap_or(APPROVAL_NOID);
            let submitter = self.ledger.get_submitter(record.id, approval_id).await?;
            if submitter != cmd.actor {
                return Err(ApprovalException::CancelDenied {
                    record_id: record.id,
                    user: cmd.actor,
                });
            }
        }

        self.settle_instance(&record, &cmd, NODE_CANCELED, ApprovalState::Canceled)
            .await?;
        self.record_mutator
            .mark_state(record.id, ApprovalState::Canceled, None)
            .await?;
        tracing::info!("Approval of record: {} canceled by: {}", record.id, cmd.actor);
        Ok(())
    }

    async fn revoke(&self, cmd: CancelCommand) -> ApprovalResult<()> {
        if !self.privilege_service.is_admin(cmd.actor).await? {
            return Err(ApprovalException::RevokeDenied { user: cmd.actor });
        }
        let record = self.record_mutator.get_record(cmd.record_id).await?;
        if record.approval_state != ApprovalState::Approved {
            return Err(ApprovalException::InvalidState {
                record_id: record.id,
                state: record.approval_state,
            });
        }

        self.settle_instance(&record, &cmd, NODE_REVOKED, ApprovalState::Revoked)
            .await?;
        self.record_mutator
            .approve(record.id, ApprovalState::Revoked, None)
            .await?;
        tracing::info!("Approval of record: {} revoked by: {}", record.id, cmd.actor);
        Ok(())
    }

    async fn auto_approve(&self, cmd: AutoApproveCommand) -> ApprovalResult<bool> {
        let record = self.record_mutator.get_record(cmd.record_id).await?;
        if matches!(
            record.approval_state,
            ApprovalState::Processing | ApprovalState::Approved
        ) {
            tracing::warn!(
                "Record: {} is {}, refuse to auto approve",
                record.id,
                record.approval_state
            );
            return Ok(false);
        }
        let record_id = record.id;
        let approver = cmd.acting_user.unwrap_or(SYSTEM_USER);
        let approval_id = cmd.approval_id.unwrap_or(APPROVAL_NOID);

        self.ledger
            .cancel_alive_steps(CancelStepsCommand {
                record_id,
                ..Default::default()
            })
            .await?;
        self.ledger
            .create_settled_step(
                CreateStepCommand {
                    record_id,
                    approval_id,
                    node: NODE_AUTOAPPROVAL.to_string(),
                    approver,
                    is_waiting: false,
                    prev_node: Some(NODE_ROOT.to_string()),
                    created_by: approver,
                },
                ApprovalState::Approved,
                Some("auto approval".to_string()),
            )
            .await?;
        self.ledger.evict_submitter(record_id, approval_id);
        self.record_mutator
            .bind_instance(record_id, approval_id, NODE_AUTOAPPROVAL.to_string())
            .await?;
        self.record_mutator
            .approve(record_id, ApprovalState::Approved, Some(approver))
            .await?;
        tracing::info!("Record: {record_id} auto approved by: {approver}");
        Ok(true)
    }

    async fn get_current_step(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
    ) -> ApprovalResult<Vec<CurrentStep>> {
        let record = self.record_mutator.get_record(record_id).await?;
        if record.approval_id != Some(approval_id) {
            return Ok(vec![]);
        }
        self.current_steps(&record).await
    }

    async fn get_workable_definitions(
        &self,
        record_id: Uuid,
        user: Uuid,
    ) -> ApprovalResult<Vec<FlowDefinitionRef>> {
        let mut definitions = self
            .flow_resolver
            .get_workable_definitions(record_id, user)
            .await?;
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(definitions)
    }

    async fn get_next_node_candidates(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
        user: Uuid,
    ) -> ApprovalResult<NextNodeCandidates> {
        let record = self.record_mutator.get_record(record_id).await?;
        let node = match (&record.approval_step_node, record.approval_state) {
            (Some(node), ApprovalState::Processing) if record.approval_id == Some(approval_id) => {
                node.to_owned()
            }
            _ => NODE_ROOT.to_string(),
        };
        let editable_fields = if node == NODE_ROOT {
            vec![]
        } else {
            self.flow_resolver
                .get_current_node(record_id, approval_id, node.to_owned())
                .await?
                .editable_fields
        };
        let group = self
            .flow_resolver
            .get_next_nodes(record_id, approval_id, node, user)
            .await?;
        Ok(NextNodeCandidates {
            approvers: group.approvers,
            cc_users: group.cc_users,
            approver_self_selecting: group.allow_self_selecting_approver,
            cc_self_selecting: group.allow_self_selecting_cc,
            sign_mode: group.sign_mode,
            is_last_step: group.is_last_step,
            flow_group_id: group.group_id,
            editable_fields,
        })
    }

    async fn get_approval_status(
        &self,
        record_id: Uuid,
        user: Uuid,
    ) -> ApprovalResult<ApprovalStatusView> {
        let record = self.record_mutator.get_record(record_id).await?;
        let mut view = ApprovalStatusView {
            state: record.approval_state,
            approval_id: record.approval_id,
            ..Default::default()
        };
        let Some(approval_id) = record.approval_id else {
            return Ok(view);
        };
        if record.approval_state.is_before_approval() {
            view.current_step = self.current_steps(&record).await?;
            if let Some(mine) = view.current_step.iter().find(|s| s.approver == user) {
                view.im_approver = true;
                view.im_approve_state = Some(mine.state);
            }
        }
        if record.approval_state == ApprovalState::Processing {
            view.can_cancel = self.ledger.get_submitter(record_id, approval_id).await? == user;
        }
        Ok(view)
    }

    async fn get_worked_steps(&self, record_id: Uuid) -> ApprovalResult<WorkedSteps> {
        let record = self.record_mutator.get_record(record_id).await?;
        let mut worked = WorkedSteps {
            approval_state: record.approval_state,
            ..Default::default()
        };
        let Some(approval_id) = record.approval_id else {
            return Ok(worked);
        };

        // The run starts at the earliest alive step; older rows belong to superseded runs.
        let steps = self.ledger.get_record_steps(record_id).await?;
        let Some(start) = steps
            .iter()
            .position(|s| s.approval_id == approval_id && s.is_alive())
        else {
            return Ok(worked);
        };
        worked.submitter = Some(steps[start].created_by);
        worked.submitted_on = Some(steps[start].created_on);

        for step in steps[start..].iter().filter(|s| s.approval_id == approval_id) {
            match worked.nodes.iter_mut().find(|n| n.node == step.node) {
                Some(node) => node.steps.push(StepView::from(step)),
                None => worked.nodes.push(WorkedNode {
                    node: step.node.to_owned(),
                    steps: vec![StepView::from(step)],
                }),
            }
        }
        Ok(worked)
    }
}
