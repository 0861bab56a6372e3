use topsongs::types::{Token, TokenResponse};

fn token(expires_in: u64, obtained_at: u64) -> Token {
    Token {
        access_token: "initial-access".to_string(),
        refresh_token: "initial-refresh".to_string(),
        expires_in,
        obtained_at,
    }
}

#[test]
fn test_expiry_boundaries() {
    let t = token(3600, 1_000_000);

    // Valid strictly before the absolute expiry
    assert!(!t.is_expired(1_000_000));
    assert!(!t.is_expired(1_003_599));

    // Expired exactly at and after the boundary
    assert!(t.is_expired(1_003_600));
    assert!(t.is_expired(1_003_601));
}

#[test]
fn test_apply_refresh_updates_expiry() {
    let mut t = token(3600, 1_000_000);

    t.apply_refresh(
        TokenResponse {
            access_token: "new-access".to_string(),
            refresh_token: None,
            expires_in: 1800,
        },
        1_003_700,
    );

    assert_eq!(t.access_token, "new-access");
    assert_eq!(t.obtained_at, 1_003_700);
    assert_eq!(t.expires_in, 1800);
    assert!(!t.is_expired(1_003_700));
    assert!(t.is_expired(1_005_500));
}

#[test]
fn test_apply_refresh_retains_old_refresh_token_without_rotation() {
    let mut t = token(3600, 1_000_000);

    t.apply_refresh(
        TokenResponse {
            access_token: "new-access".to_string(),
            refresh_token: None,
            expires_in: 3600,
        },
        1_003_700,
    );

    assert_eq!(t.refresh_token, "initial-refresh");
}

#[test]
fn test_apply_refresh_takes_rotated_refresh_token() {
    let mut t = token(3600, 1_000_000);

    t.apply_refresh(
        TokenResponse {
            access_token: "new-access".to_string(),
            refresh_token: Some("rotated-refresh".to_string()),
            expires_in: 3600,
        },
        1_003_700,
    );

    assert_eq!(t.refresh_token, "rotated-refresh");
}

#[test]
fn test_exchange_response_into_token() {
    let t = TokenResponse {
        access_token: "access".to_string(),
        refresh_token: Some("refresh".to_string()),
        expires_in: 3600,
    }
    .into_token();

    assert_eq!(t.access_token, "access");
    assert_eq!(t.refresh_token, "refresh");
    assert_eq!(t.expires_in, 3600);

    let now = chrono::Utc::now().timestamp() as u64;
    assert!(!t.is_expired(now));
}
