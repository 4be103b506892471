use actix_web::{
    get, post,
    web::{self, Json, Path, Query},
    HttpRequest,
};
use domain_approval::{
    command::{AutoApproveCommand, CancelCommand, DecideCommand, StartCommand},
    exception::ApprovalException,
    model::{
        entity::ApprovalRecord,
        vo::{
            ApprovalState, ApprovalStatusView, CurrentStep, FlowDefinitionRef, NextNodeCandidates,
            RecordEdit, WorkedSteps,
        },
    },
};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{acting_user, respond, ResponseBase};
use crate::infrastructure::ServiceProvider;

macro_rules! user_or_return {
    ($req:expr) => {
        match acting_user(&$req) {
            Ok(user) => user,
            Err(response) => return response,
        }
    };
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InstanceQuery {
    record_id: Uuid,
    approval_id: Uuid,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    record_id: Uuid,
    approval_id: Uuid,
    #[serde(default)]
    selected_approvers: Vec<Uuid>,
    #[serde(default)]
    selected_cc_users: Vec<Uuid>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    record_id: Uuid,
    state: ApprovalState,
    remark: Option<String>,
    #[serde(default)]
    selected_approvers: Vec<Uuid>,
    #[serde(default)]
    selected_cc_users: Vec<Uuid>,
    /// Field values the approver changed while deciding.
    edited: Option<Map<String, Value>>,
    use_group: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    record_id: Uuid,
    approval_id: Option<Uuid>,
    current_node: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AutoApproveRequest {
    record_id: Uuid,
    approval_id: Option<Uuid>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRecordRequest {
    id: Option<Uuid>,
    entity: String,
    #[serde(default = "has_last_user")]
    has_last_user: bool,
    #[serde(default)]
    fields: Map<String, Value>,
}

fn has_last_user() -> bool {
    true
}

#[tracing::instrument(skip(sp, req))]
#[get("approval/Workable/{record_id}")]
pub async fn workable(
    sp: web::Data<ServiceProvider>,
    req: HttpRequest,
    record_id: Path<Uuid>,
) -> Json<ResponseBase<Vec<FlowDefinitionRef>>> {
    let user = user_or_return!(req);
    respond(
        sp.approval_service()
            .get_workable_definitions(record_id.into_inner(), user)
            .await,
    )
}

#[tracing::instrument(skip(sp, req))]
#[get("approval/State/{record_id}")]
pub async fn state(
    sp: web::Data<ServiceProvider>,
    req: HttpRequest,
    record_id: Path<Uuid>,
) -> Json<ResponseBase<ApprovalStatusView>> {
    let user = user_or_return!(req);
    respond(sp.approval_service().get_approval_status(record_id.into_inner(), user).await)
}

#[tracing::instrument(skip(sp, req))]
#[get("approval/FetchNextStep")]
pub async fn fetch_next_step(
    sp: web::Data<ServiceProvider>,
    req: HttpRequest,
    query: Query<InstanceQuery>,
) -> Json<ResponseBase<NextNodeCandidates>> {
    let user = user_or_return!(req);
    respond(
        sp.approval_service()
            .get_next_node_candidates(query.record_id, query.approval_id, user)
            .await,
    )
}

#[tracing::instrument(skip(sp))]
#[get("approval/FetchWorkedSteps/{record_id}")]
pub async fn fetch_worked_steps(
    sp: web::Data<ServiceProvider>,
    record_id: Path<Uuid>,
) -> Json<ResponseBase<WorkedSteps>> {
    respond(sp.approval_service().get_worked_steps(record_id.into_inner()).await)
}

#[tracing::instrument(skip(sp))]
#[get("approval/CurrentStep")]
pub async fn current_step(
    sp: web::Data<ServiceProvider>,
    query: Query<InstanceQuery>,
) -> Json<ResponseBase<Vec<CurrentStep>>> {
    respond(
        sp.approval_service()
            .get_current_step(query.record_id, query.approval_id)
            .await,
    )
}

#[tracing::instrument(skip(sp, req))]
#[post("approval/Submit")]
pub async fn submit(
    sp: web::Data<ServiceProvider>,
    req: HttpRequest,
    body: Json<SubmitRequest>,
) -> Json<ResponseBase<()>> {
    let submitter = user_or_return!(req);
    let body = body.into_inner();
    respond(
        sp.approval_service()
            .start(StartCommand {
                record_id: body.record_id,
                approval_id: body.approval_id,
                submitter,
                selected_approvers: body.selected_approvers,
                selected_cc_users: body.selected_cc_users,
            })
            .await,
    )
}

#[tracing::instrument(skip(sp, req))]
#[post("approval/Approve")]
pub async fn approve(
    sp: web::Data<ServiceProvider>,
    req: HttpRequest,
    body: Json<ApproveRequest>,
) -> Json<ResponseBase<()>> {
    let approver = user_or_return!(req);
    let body = body.into_inner();
    let edited = body.edited.map(|fields| RecordEdit {
        record_id: body.record_id,
        fields,
    });
    respond(
        sp.approval_service()
            .decide(DecideCommand {
                record_id: body.record_id,
                approver,
                state: body.state,
                remark: body.remark,
                selected_approvers: body.selected_approvers,
                selected_cc_users: body.selected_cc_users,
                edited,
                use_group: body.use_group,
            })
            .await,
    )
}

#[tracing::instrument(skip(sp, req))]
#[post("approval/Cancel")]
pub async fn cancel(
    sp: web::Data<ServiceProvider>,
    req: HttpRequest,
    body: Json<CancelRequest>,
) -> Json<ResponseBase<()>> {
    let actor = user_or_return!(req);
    respond(sp.approval_service().cancel(body.into_inner().into_command(actor)).await)
}

#[tracing::instrument(skip(sp, req))]
#[post("approval/Revoke")]
pub async fn revoke(
    sp: web::Data<ServiceProvider>,
    req: HttpRequest,
    body: Json<CancelRequest>,
) -> Json<ResponseBase<()>> {
    let actor = user_or_return!(req);
    respond(sp.approval_service().revoke(body.into_inner().into_command(actor)).await)
}

impl CancelRequest {
    fn into_command(self, actor: Uuid) -> CancelCommand {
        CancelCommand {
            record_id: self.record_id,
            approval_id: self.approval_id,
            current_node: self.current_node,
            actor,
        }
    }
}

/// Returns whether the record was approved by this call. Administrators only.
#[tracing::instrument(skip(sp, req))]
#[post("approval/AutoApprove")]
pub async fn auto_approve(
    sp: web::Data<ServiceProvider>,
    req: HttpRequest,
    body: Json<AutoApproveRequest>,
) -> Json<ResponseBase<bool>> {
    let user = user_or_return!(req);
    let record_id = body.record_id;
    respond(
        async {
            if !sp.privilege_service().is_admin(user).await? {
                return Err(ApprovalException::AutoApproveDenied { record_id, user });
            }
            sp.approval_service()
                .auto_approve(AutoApproveCommand {
                    record_id,
                    acting_user: Some(user),
                    approval_id: body.approval_id,
                })
                .await
        }
        .await,
    )
}

#[tracing::instrument(skip(sp))]
#[post("approval/RegisterRecord")]
pub async fn register_record(
    sp: web::Data<ServiceProvider>,
    body: Json<RegisterRecordRequest>,
) -> Json<ResponseBase<ApprovalRecord>> {
    let body = body.into_inner();
    let record = sp.store().register_record(
        body.id.unwrap_or_else(Uuid::new_v4),
        body.entity,
        body.has_last_user,
        body.fields,
    );
    tracing::info!("Record: {} registered as {}", record.id, record.entity);
    Json(ResponseBase::ok(Some(record)))
}
