//! 授权核心集成测试
//! 策略表 + 授权门的组合行为，全程内存构造，无需数据库

use market_system::authz::{
    authorize, policy_for, requirement_for, visibility_filter, Identity, Operation, Requirement,
};
use uuid::Uuid;

mod common;
use common::{make_role, make_user};

fn identity(slug: &str, grants: &[(&str, &str)]) -> Identity {
    let role = make_role(slug, grants);
    let user = make_user(role.role.id);
    Identity { user, role }
}

/// 按策略表评估一次操作
fn check(kind: &str, op: Operation, identity: &Identity, owner_id: Option<Uuid>) -> bool {
    let policy = policy_for(kind);
    match requirement_for(&policy, op, owner_id) {
        None => true,
        Some(requirement) => authorize(identity, &requirement).is_ok(),
    }
}

#[test]
fn test_service_lifecycle_matrix() {
    let freelancer = identity("freelancer", &[]);
    let client = identity("client", &[]);
    let admin = identity("admin", &[]);

    // 创建：自由职业者与管理员可以，客户不可以
    assert!(check("service", Operation::Create, &freelancer, None));
    assert!(check("service", Operation::Create, &admin, None));
    assert!(!check("service", Operation::Create, &client, None));

    // 状态迁移（审核）：仅管理员，属主也不行
    let owner = freelancer.id();
    assert!(!check("service", Operation::Transition, &freelancer, Some(owner)));
    assert!(check("service", Operation::Transition, &admin, Some(owner)));
}

#[test]
fn test_job_posting_is_client_territory() {
    let freelancer = identity("freelancer", &[]);
    let client = identity("client", &[]);

    assert!(check("job", Operation::Create, &client, None));
    assert!(!check("job", Operation::Create, &freelancer, None));
}

#[test]
fn test_private_resources_ignore_admin_override() {
    let admin = identity("admin", &[]);
    let owner = identity("client", &[]);
    let owner_id = owner.id();

    // 消息只有属主能删，管理员也不行
    assert!(check("message", Operation::Delete, &owner, Some(owner_id)));
    assert!(!check("message", Operation::Delete, &admin, Some(owner_id)));
}

#[test]
fn test_granted_permission_opens_role_management() {
    let moderator = identity("moderator", &[("create", "role"), ("update", "role")]);

    assert!(check("role", Operation::Create, &moderator, None));

    // delete 没授权，策略写规则是 create/role，且非管理员
    let requirement = Requirement::AnyOf(vec![
        Requirement::permission("delete", "role"),
        Requirement::admin(),
    ]);
    assert!(authorize(&moderator, &requirement).is_err());
}

#[test]
fn test_permission_management_is_admin_territory() {
    // 授权结构本体不受 (action, "permission") 授权项影响，只认管理员角色
    let moderator = identity("moderator", &[("create", "permission"), ("delete", "permission")]);
    let admin = identity("admin", &[]);

    assert!(!check("permission", Operation::Create, &moderator, None));
    assert!(!check("permission", Operation::Delete, &moderator, None));
    assert!(check("permission", Operation::Create, &admin, None));
}

#[test]
fn test_user_profile_owner_or_admin() {
    let owner = identity("client", &[]);
    let stranger = identity("client", &[]);
    let admin = identity("admin", &[]);
    let owner_id = owner.id();

    assert!(check("user", Operation::Update, &owner, Some(owner_id)));
    assert!(check("user", Operation::Update, &admin, Some(owner_id)));
    assert!(!check("user", Operation::Update, &stranger, Some(owner_id)));
}

#[test]
fn test_visibility_filter_only_for_non_admins() {
    let admin = identity("admin", &[]);
    let client = identity("client", &[]);

    assert_eq!(visibility_filter("role", Some(&admin)), None);
    assert_eq!(visibility_filter("role", Some(&client)), Some("status = 'active'"));
    assert_eq!(visibility_filter("role", None), Some("status = 'active'"));
    assert_eq!(visibility_filter("service", None), Some("status = 'approved'"));
    assert_eq!(visibility_filter("message", None), None);
}

#[test]
fn test_authorization_does_not_mutate_identity() {
    let freelancer = identity("freelancer", &[("create", "service")]);
    let before = freelancer.role.permissions.len();

    let _ = authorize(&freelancer, &Requirement::permission("create", "service"));
    let _ = authorize(&freelancer, &Requirement::admin());

    assert_eq!(freelancer.role.permissions.len(), before);
    assert_eq!(freelancer.role_slug(), "freelancer");
}
