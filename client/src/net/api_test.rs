use super::*;

#[test]
fn endpoints_target_gateway_paths() {
    assert_eq!(USERS_EXISTS_ENDPOINT, "/api/users/exists");
    assert_eq!(CREDENTIALS_CALLBACK_ENDPOINT, "/api/auth/callback/credentials");
    assert_eq!(SIGNOUT_ENDPOINT, "/api/auth/signout");
}

#[test]
fn exists_failed_message_formats_status() {
    assert_eq!(exists_failed_message(502), "existence check failed: 502");
}

fn reply(auth: bool, reason: Option<&str>) -> Option<LoginReply> {
    Some(LoginReply { auth, reason: reason.map(str::to_owned) })
}

#[test]
fn success_statuses_grant() {
    assert_eq!(login_outcome(200, reply(true, None)), LoginOutcome::Granted);
    assert_eq!(login_outcome(204, None), LoginOutcome::Granted);
}

#[test]
fn success_status_with_refusing_reply_denies() {
    assert_eq!(login_outcome(200, reply(false, None)), LoginOutcome::Denied);
}

#[test]
fn rejection_statuses_deny() {
    assert_eq!(login_outcome(401, reply(false, Some("login rejected"))), LoginOutcome::Denied);
    assert_eq!(login_outcome(403, None), LoginOutcome::Denied);
}

#[test]
fn other_statuses_fail_with_reply_reason() {
    assert_eq!(
        login_outcome(502, reply(false, Some("backend unreachable"))),
        LoginOutcome::Failed("backend unreachable".into())
    );
}

#[test]
fn other_statuses_without_reason_fail_with_status() {
    assert_eq!(login_outcome(500, None), LoginOutcome::Failed("unexpected status 500".into()));
    assert_eq!(login_outcome(404, reply(false, None)), LoginOutcome::Failed("unexpected status 404".into()));
}

#[test]
fn sign_out_needs_a_success_status() {
    assert_eq!(sign_out_result(200), Ok(()));
    assert_eq!(sign_out_result(204), Ok(()));
    assert_eq!(sign_out_result(500), Err("sign-out failed: 500".to_owned()));
}
