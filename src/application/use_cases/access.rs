// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use uuid::Uuid;

use crate::application::dto::proposal_request::AccessLevel;
use crate::domain::models::collaboration::CollaboratorRole;
use crate::domain::models::proposal::SavedProposal;
use crate::domain::repositories::collaboration_repository::CollaborationRepository;
use crate::domain::repositories::proposal_repository::ProposalRepository;
use crate::domain::repositories::RepositoryError;

/// 计算用户对提案的访问级别
///
/// 所有者优先；其余用户按协作者角色判定，无记录返回 `None`
pub async fn access_level<C>(
    collab_repo: &C,
    proposal: &SavedProposal,
    user_id: Uuid,
) -> Result<Option<AccessLevel>, RepositoryError>
where
    C: CollaborationRepository + ?Sized,
{
    if proposal.user_id == user_id {
        return Ok(Some(AccessLevel::Owner));
    }

    Ok(collab_repo
        .find_collaborator(proposal.id, user_id)
        .await?
        .map(|c| match c.role {
            CollaboratorRole::Editor => AccessLevel::Editor,
            CollaboratorRole::Viewer => AccessLevel::Viewer,
        }))
}

/// 加载提案并校验访问权限
///
/// 提案不存在与无权访问都返回 `Ok(None)`，调用方统一按 404 处理
pub async fn load_accessible<P, C>(
    proposal_repo: &P,
    collab_repo: &C,
    proposal_id: Uuid,
    user_id: Uuid,
) -> Result<Option<(SavedProposal, AccessLevel)>, RepositoryError>
where
    P: ProposalRepository + ?Sized,
    C: CollaborationRepository + ?Sized,
{
    let Some(proposal) = proposal_repo.find_by_id(proposal_id).await? else {
        return Ok(None);
    };

    Ok(access_level(collab_repo, &proposal, user_id)
        .await?
        .map(|access| (proposal, access)))
}
