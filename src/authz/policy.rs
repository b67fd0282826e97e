//! 资源访问策略
//! 每种资源类型一条规则：谁可读、写入需要什么、管理员是否兜底。
//! 这是各路由上 auth/admin/freelancer/client/checkPermission 组合的集中化。

use super::requirement::Requirement;
use super::{Identity, ADMIN_SLUG, CLIENT_SLUG, FREELANCER_SLUG};
use uuid::Uuid;

/// 资源操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
    /// 状态迁移（approve/reject 等）——始终仅限管理员，属主身份不可替代
    Transition,
}

/// 写入规则
#[derive(Debug, Clone)]
pub enum WriteRule {
    /// 角色 slug 门控
    RoleSlug(&'static str),
    /// (action, resource) 权限门控；action 由具体操作推导（create/update/delete）
    Permission { resource: &'static str },
    /// 仅属主
    Owner,
    /// 属主或管理员
    OwnerOrAdmin,
}

/// 单个资源类型的访问策略
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    /// 读操作是否对匿名开放
    pub public_read: bool,
    /// 创建/更新/删除的默认规则
    pub write: WriteRule,
    /// 管理员是否兜底放行写操作
    pub admin_override: bool,
}

/// 资源类型 → 策略。未登记的类型一律按属主或管理员处理（保守默认）。
pub fn policy_for(kind: &str) -> AccessPolicy {
    match kind {
        // 角色与权限管理：细粒度权限门控，管理员兜底
        "role" => AccessPolicy {
            public_read: true,
            write: WriteRule::Permission { resource: "role" },
            admin_override: true,
        },
        "permission" => AccessPolicy {
            public_read: false,
            write: WriteRule::RoleSlug(ADMIN_SLUG),
            admin_override: true,
        },
        // 用户：读写默认属主或管理员
        "user" => AccessPolicy {
            public_read: false,
            write: WriteRule::OwnerOrAdmin,
            admin_override: true,
        },
        // 公开目录类资源
        "category" => AccessPolicy {
            public_read: true,
            write: WriteRule::RoleSlug(ADMIN_SLUG),
            admin_override: true,
        },
        // 服务由自由职业者创建
        "service" => AccessPolicy {
            public_read: true,
            write: WriteRule::RoleSlug(FREELANCER_SLUG),
            admin_override: true,
        },
        // 职位由客户创建
        "job" => AccessPolicy {
            public_read: false,
            write: WriteRule::RoleSlug(CLIENT_SLUG),
            admin_override: true,
        },
        "review" => AccessPolicy {
            public_read: true,
            write: WriteRule::OwnerOrAdmin,
            admin_override: true,
        },
        // 私有资源：消息、收藏、通知等只对属主可见
        "message" | "favorite" | "notification" => AccessPolicy {
            public_read: false,
            write: WriteRule::Owner,
            admin_override: false,
        },
        "portfolio" | "inquiry" | "task" => AccessPolicy {
            public_read: false,
            write: WriteRule::OwnerOrAdmin,
            admin_override: true,
        },
        _ => AccessPolicy {
            public_read: false,
            write: WriteRule::OwnerOrAdmin,
            admin_override: true,
        },
    }
}

/// 由策略、操作和（可选的）资源属主推导出要评估的 Requirement。
/// 返回 None 表示无需身份（匿名可行）。
pub fn requirement_for(
    policy: &AccessPolicy,
    op: Operation,
    owner_id: Option<Uuid>,
) -> Option<Requirement> {
    match op {
        Operation::Read => {
            if policy.public_read {
                None
            } else {
                Some(owner_or_admin(owner_id))
            }
        }
        // 状态迁移仅限管理员，无视属主与策略覆盖
        Operation::Transition => Some(Requirement::admin()),
        Operation::Create | Operation::Update | Operation::Delete => {
            let action = match op {
                Operation::Create => "create",
                Operation::Update => "update",
                _ => "delete",
            };

            let base = match &policy.write {
                WriteRule::RoleSlug(slug) => Requirement::role_slug(*slug),
                WriteRule::Permission { resource } => Requirement::permission(action, *resource),
                // 创建时还没有属主，归属规则退化为"已认证即可"
                WriteRule::Owner => match owner_id {
                    Some(owner_id) => Requirement::Owner { owner_id },
                    None => return Some(Requirement::Authenticated),
                },
                WriteRule::OwnerOrAdmin => match owner_id {
                    Some(owner_id) => Requirement::OwnerOrAdmin { owner_id },
                    None => return Some(Requirement::Authenticated),
                },
            };

            if policy.admin_override && !is_admin_rule(&base) {
                Some(Requirement::AnyOf(vec![base, Requirement::admin()]))
            } else {
                Some(base)
            }
        }
    }
}

/// 列表可见性过滤建议：门决定"是否可访问"，过滤器决定"可见集合里有什么"。
/// 这是协作方查询层的约束，不是授权判定——非管理员只应看到 active/approved 的行。
pub fn visibility_filter(kind: &str, identity: Option<&Identity>) -> Option<&'static str> {
    let is_admin = identity.map(|i| i.is_admin()).unwrap_or(false);
    if is_admin {
        return None;
    }

    match kind {
        "category" | "role" => Some("status = 'active'"),
        "service" => Some("status = 'approved'"),
        _ => None,
    }
}

fn owner_or_admin(owner_id: Option<Uuid>) -> Requirement {
    match owner_id {
        Some(owner_id) => Requirement::OwnerOrAdmin { owner_id },
        None => Requirement::admin(),
    }
}

fn is_admin_rule(requirement: &Requirement) -> bool {
    matches!(requirement, Requirement::RoleSlug(slug) if slug == ADMIN_SLUG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_read_needs_no_identity() {
        let policy = policy_for("category");
        assert!(policy.public_read);
        assert!(requirement_for(&policy, Operation::Read, None).is_none());
    }

    #[test]
    fn test_private_read_falls_back_to_owner_or_admin() {
        let policy = policy_for("message");
        let owner = Uuid::new_v4();
        let requirement = requirement_for(&policy, Operation::Read, Some(owner)).unwrap();
        assert!(matches!(requirement, Requirement::OwnerOrAdmin { owner_id } if owner_id == owner));
    }

    #[test]
    fn test_service_create_is_freelancer_gated_with_admin_override() {
        let policy = policy_for("service");
        let requirement = requirement_for(&policy, Operation::Create, None).unwrap();

        match requirement {
            Requirement::AnyOf(reqs) => {
                assert_eq!(reqs.len(), 2);
                assert!(matches!(&reqs[0], Requirement::RoleSlug(s) if s == "freelancer"));
                assert!(matches!(&reqs[1], Requirement::RoleSlug(s) if s == "admin"));
            }
            other => panic!("expected AnyOf, got {:?}", other),
        }
    }

    #[test]
    fn test_job_create_is_client_gated() {
        let policy = policy_for("job");
        let requirement = requirement_for(&policy, Operation::Create, None).unwrap();
        match requirement {
            Requirement::AnyOf(reqs) => {
                assert!(matches!(&reqs[0], Requirement::RoleSlug(s) if s == "client"));
            }
            other => panic!("expected AnyOf, got {:?}", other),
        }
    }

    #[test]
    fn test_transition_is_admin_only_even_for_owner() {
        let policy = policy_for("service");
        let owner = Uuid::new_v4();
        let requirement =
            requirement_for(&policy, Operation::Transition, Some(owner)).unwrap();
        assert!(matches!(requirement, Requirement::RoleSlug(s) if s == "admin"));
    }

    #[test]
    fn test_unknown_kind_is_conservative() {
        let policy = policy_for("something-new");
        assert!(!policy.public_read);
        let owner = Uuid::new_v4();
        let requirement = requirement_for(&policy, Operation::Delete, Some(owner)).unwrap();
        assert!(matches!(requirement, Requirement::AnyOf(_)));
    }

    #[test]
    fn test_owner_only_kinds_have_no_admin_override() {
        let policy = policy_for("message");
        let owner = Uuid::new_v4();
        let requirement = requirement_for(&policy, Operation::Delete, Some(owner)).unwrap();
        assert!(matches!(requirement, Requirement::Owner { .. }));
    }

    #[test]
    fn test_role_create_is_permission_gated() {
        let policy = policy_for("role");
        let requirement = requirement_for(&policy, Operation::Create, None).unwrap();
        match requirement {
            Requirement::AnyOf(reqs) => {
                assert!(matches!(
                    &reqs[0],
                    Requirement::Permission { action, resource }
                        if action == "create" && resource == "role"
                ));
            }
            other => panic!("expected AnyOf, got {:?}", other),
        }
    }

    #[test]
    fn test_permission_action_follows_operation() {
        let policy = policy_for("role");

        for (op, expected) in [
            (Operation::Create, "create"),
            (Operation::Update, "update"),
            (Operation::Delete, "delete"),
        ] {
            let requirement = requirement_for(&policy, op, None).unwrap();
            match requirement {
                Requirement::AnyOf(reqs) => {
                    assert!(
                        matches!(
                            &reqs[0],
                            Requirement::Permission { action, resource }
                                if action == expected && resource == "role"
                        ),
                        "operation {:?} should derive action {}",
                        op,
                        expected
                    );
                }
                other => panic!("expected AnyOf, got {:?}", other),
            }
        }
    }
}
