//! Predicates for common waits
//!
//! Plain functions returning closures for [`Service::wait_for`](super::Service::wait_for).
//! Nothing here is special to the polling loop; callers can write their own.

use super::Condition;
use crate::model::{
    CustomImageImport, LoadBalancer, LoadBalancerPoolMember, Server, Volume, IMPORT_FAILED,
    IMPORT_SUCCESS, LOAD_BALANCER_ERROR, LOAD_BALANCER_RUNNING, MEMBER_NO_MONITOR, MEMBER_UP,
    SERVER_ERRORED, SERVER_RUNNING, SERVER_STOPPED,
};

/// Server reached `status`; `errored` ends the wait.
pub fn server_is(status: &str) -> impl Fn(&Server) -> Condition {
    let status = status.to_string();
    move |server| {
        if server.status == status {
            Condition::Met
        } else if server.status == SERVER_ERRORED {
            Condition::Never(format!("server {} is {}", server.uuid, SERVER_ERRORED))
        } else {
            Condition::NotYet
        }
    }
}

pub fn server_is_running() -> impl Fn(&Server) -> Condition {
    server_is(SERVER_RUNNING)
}

pub fn server_is_stopped() -> impl Fn(&Server) -> Condition {
    server_is(SERVER_STOPPED)
}

pub fn load_balancer_is_running() -> impl Fn(&LoadBalancer) -> Condition {
    |lb| match lb.status.as_str() {
        LOAD_BALANCER_RUNNING => Condition::Met,
        LOAD_BALANCER_ERROR => {
            Condition::Never(format!("load balancer {} is in error state", lb.uuid))
        }
        _ => Condition::NotYet,
    }
}

/// Import succeeded; a failed import carries its error message.
pub fn custom_image_import_is_finished() -> impl Fn(&CustomImageImport) -> Condition {
    |import| match import.status.as_str() {
        IMPORT_SUCCESS => Condition::Met,
        IMPORT_FAILED => Condition::Never(format!(
            "import {} failed: {}",
            import.uuid, import.error_message
        )),
        _ => Condition::NotYet,
    }
}

pub fn volume_attached_to(server_uuid: &str) -> impl Fn(&Volume) -> Condition {
    let server_uuid = server_uuid.to_string();
    move |volume| {
        if volume.server_uuids.iter().any(|s| *s == server_uuid) {
            Condition::Met
        } else {
            Condition::NotYet
        }
    }
}

/// Member passes health checks. Members without a monitor count as up.
pub fn pool_member_is_up() -> impl Fn(&LoadBalancerPoolMember) -> Condition {
    |member| match member.monitor_status.as_str() {
        MEMBER_UP | MEMBER_NO_MONITOR => Condition::Met,
        _ => Condition::NotYet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(status: &str) -> Server {
        Server {
            uuid: "s-1".to_string(),
            status: status.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_server_predicates() {
        let running = server_is_running();
        assert_eq!(running(&server("running")), Condition::Met);
        assert_eq!(running(&server("changing")), Condition::NotYet);
        assert!(matches!(running(&server("errored")), Condition::Never(_)));

        let stopped = server_is_stopped();
        assert_eq!(stopped(&server("stopped")), Condition::Met);
        assert_eq!(stopped(&server("running")), Condition::NotYet);
    }

    #[test]
    fn test_import_failure_carries_message() {
        let import = CustomImageImport {
            uuid: "i-1".to_string(),
            status: "failed".to_string(),
            error_message: "checksum mismatch".to_string(),
            ..Default::default()
        };
        match custom_image_import_is_finished()(&import) {
            Condition::Never(reason) => assert!(reason.contains("checksum mismatch")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_volume_attachment() {
        let volume = Volume {
            server_uuids: vec!["a".to_string()],
            ..Default::default()
        };
        assert_eq!(volume_attached_to("a")(&volume), Condition::Met);
        assert_eq!(volume_attached_to("b")(&volume), Condition::NotYet);
    }

    #[test]
    fn test_pool_member_without_monitor_is_up() {
        let member = LoadBalancerPoolMember {
            monitor_status: "no_monitor".to_string(),
            ..Default::default()
        };
        assert_eq!(pool_member_is_up()(&member), Condition::Met);
    }

    #[test]
    fn test_load_balancer_error_is_terminal() {
        let lb = LoadBalancer {
            status: "error".to_string(),
            ..Default::default()
        };
        assert!(matches!(load_balancer_is_running()(&lb), Condition::Never(_)));
    }
}
