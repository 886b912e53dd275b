#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use std::path::PathBuf;

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::{PredicateBooleanExt, predicate};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHAWSHANK: &str = r#"[{"id":278,"title":"The Shawshank Redemption","release_date":"1994-09-23"}]"#;
const POSTS: &str = r#"[{"postId":1,"memberNo":8,"memberNick":"nachos","movieId":278,"ratingStar":4,"postContent":"Hope","regDate":"2024-09-01"}]"#;

fn json(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(String::from(body), "application/json")
}

async fn mount_anonymous(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/member/check_auth"))
        .respond_with(ResponseTemplate::new(401))
        .mount(server)
        .await;
}

/// Runs the binary against `server` off the async runtime.
async fn run_filmlog(
    server: &MockServer,
    dir: PathBuf,
    args: &'static [&'static str],
) -> assert_cmd::assert::Assert {
    let base_url = format!("{}/api/", server.uri());
    tokio::task::spawn_blocking(move || {
        cargo_bin_cmd!("filmlog")
            .args(args)
            .arg("--base-url")
            .arg(base_url)
            .arg("--dir")
            .arg(dir)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .assert()
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_now_playing_renders_enriched_table() {
    // Arrange
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    mount_anonymous(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/movies/now_playing"))
        .respond_with(json(SHAWSHANK))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/likes/likesMovie"))
        .and(query_param("movieId", "278"))
        .respond_with(json("3"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/posts/movie/278"))
        .respond_with(json(POSTS))
        .mount(&server)
        .await;

    // Act
    let assert = run_filmlog(&server, tmp.path().to_path_buf(), &["movies", "now-playing"]).await;

    // Assert
    assert.success().stdout(predicate::str::contains(
        "278\t4.0\t3\t-\t1994-09-23\tThe Shawshank Redemption",
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_movies_show_fetches_reviews_once() {
    // Arrange
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    mount_anonymous(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/movies/278"))
        .respond_with(json(
            r#"{"id":278,"title":"The Shawshank Redemption","release_date":"1994-09-23"}"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/likes/likesMovie"))
        .respond_with(json("3"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/posts/movie/278"))
        .respond_with(json(POSTS))
        .expect(1)
        .mount(&server)
        .await;

    // Act
    let assert = run_filmlog(
        &server,
        tmp.path().to_path_buf(),
        &["movies", "show", "--id", "278"],
    )
    .await;

    // Assert
    assert
        .success()
        .stdout(predicate::str::contains("The Shawshank Redemption"))
        .stdout(predicate::str::contains("nachos"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_auth_status_when_anonymous() {
    // Arrange
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    mount_anonymous(&server).await;

    // Act
    let assert = run_filmlog(&server, tmp.path().to_path_buf(), &["auth", "status"]).await;

    // Assert
    assert
        .success()
        .stdout(predicate::str::contains("Not logged in."));
    let session = std::fs::read_to_string(tmp.path().join("session.toml")).unwrap();
    assert!(!session.contains("accessToken"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_persists_session_cookie() {
    // Arrange
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "accessToken=abc123; Path=/")
                .set_body_string("로그인 성공"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/member/check_auth"))
        .respond_with(json(r#"{"memberNo":7}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/member/profile"))
        .respond_with(json(r#"{"memberNo":7,"memberNick":"popcorn"}"#))
        .mount(&server)
        .await;

    // Act
    let assert = run_filmlog(
        &server,
        tmp.path().to_path_buf(),
        &["auth", "login", "--username", "popcorn@example.com", "--password", "secret"],
    )
    .await;

    // Assert
    assert
        .success()
        .stdout(predicate::str::contains("Welcome, popcorn (#7)"));
    let session = std::fs::read_to_string(tmp.path().join("session.toml")).unwrap();
    assert!(session.contains("accessToken=abc123"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_posts_add_requires_login() {
    // Arrange
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    mount_anonymous(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/posts/register"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    // Act
    let assert = run_filmlog(
        &server,
        tmp.path().to_path_buf(),
        &["posts", "add", "--movie-id", "278", "--rating", "5", "--content", "Hope"],
    )
    .await;

    // Assert
    assert
        .failure()
        .stderr(predicate::str::contains("You must be logged in"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_posts_movie_shows_first_page_only() {
    // Arrange
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    mount_anonymous(&server).await;
    let posts: Vec<String> = (1..=7)
        .map(|id| {
            format!(
                r#"{{"postId":{id},"memberNo":8,"memberNick":"nachos","movieId":278,"ratingStar":3,"regDate":"2024-09-0{id}"}}"#
            )
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/posts/movie/278"))
        .respond_with(json(&format!("[{}]", posts.join(","))))
        .mount(&server)
        .await;

    // Act
    let assert = run_filmlog(&server, tmp.path().to_path_buf(), &["posts", "movie", "--id", "278"]).await;

    // Assert
    assert
        .success()
        .stdout(predicate::str::contains("Showing 5/7 reviews (use --pages 2)."))
        .stdout(predicate::str::contains("2024-09-05"))
        .stdout(predicate::str::contains("2024-09-06").not());
}
