//! filmlog - movie review service CLI.

/// Application configuration (TOML) and session cookies.
mod config;
/// Tabular output through `tracing`.
mod output;
/// Terminal UI components.
mod tui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::{
    AppConfig, clear_cookies, resolve_config_path, resolve_session_path, restore_cookies,
    save_cookies,
};
use filmlog_api::fallback::{
    delete_member_image_quietly, nickname_duplicate_or_false, posts_by_member_or_empty,
    posts_by_movie_or_empty, random_trailer,
};
use filmlog_api::types::{NewPost, SocialJoinForm};
use filmlog_api::{FilmlogClient, LocalMemberApi, LocalMovieApi, LocalPostApi};
use filmlog_view::enrich::{enrich_movie, enrich_movie_with_posts, load_movie_list};
use filmlog_view::likes::{LikeOutcome, toggle_like};
use filmlog_view::nickname::{
    CheckPolicy, GateError, NicknameGate, ProfileEditForm, submit_profile_edit,
    submit_social_join,
};
use filmlog_view::paging::IncrementalList;
use filmlog_view::profile::{load_other_profile, load_own_profile};
use filmlog_view::search::SearchFeed;
use filmlog_view::{AuthStatus, Session};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Backend base URL (overrides `[api] base_url` in config.toml).
    #[arg(long, global = true, env = "FILMLOG_BASE_URL")]
    base_url: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Log in and out.
    Auth(AuthCommand),
    /// Browse and search movies.
    Movies(MoviesCommand),
    /// Read and write reviews.
    Posts(PostsCommand),
    /// Like or unlike movies.
    Likes(LikesCommand),
    /// Member profiles and account settings.
    Member(MemberCommand),
    /// Manage config.toml.
    Config(ConfigCommand),
    /// Browse now-playing movies and their reviews via TUI.
    Browse,
}

/// Arguments for the `auth` subcommand.
#[derive(clap::Args)]
struct AuthCommand {
    /// Auth subcommand to run.
    #[command(subcommand)]
    command: AuthSubcommands,
}

/// Available auth subcommands.
#[derive(Subcommand)]
enum AuthSubcommands {
    /// Log in and store the session cookie.
    Login(LoginArgs),
    /// Log out and forget the session cookie.
    Logout,
    /// Show who is logged in.
    Status,
}

/// Arguments for the `auth login` subcommand.
#[derive(clap::Args)]
struct LoginArgs {
    /// Member e-mail or username.
    #[arg(long)]
    username: String,

    /// Password.
    #[arg(long, env = "FILMLOG_PASSWORD", hide_env_values = true)]
    password: String,
}

/// Arguments for the `movies` subcommand.
#[derive(clap::Args)]
struct MoviesCommand {
    /// Movies subcommand to run.
    #[command(subcommand)]
    command: MoviesSubcommands,
}

/// Available movies subcommands.
#[derive(Subcommand)]
enum MoviesSubcommands {
    /// Movies now in theaters.
    NowPlaying,
    /// Highest rated movies.
    TopRated,
    /// Most liked movies.
    TopLiked,
    /// Movie details with reviews.
    Show(MovieIdArgs),
    /// Pick a random trailer of a movie.
    Trailer(MovieIdArgs),
    /// Search movies by keyword.
    Search(SearchArgs),
}

/// Arguments naming one movie.
#[derive(clap::Args)]
struct MovieIdArgs {
    /// TMDB movie ID.
    #[arg(long)]
    id: u64,
}

/// Arguments for the `movies search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search keyword.
    #[arg(long)]
    keyword: String,

    /// Number of result pages to load.
    #[arg(long, default_value_t = 1)]
    pages: u32,
}

/// Arguments for the `posts` subcommand.
#[derive(clap::Args)]
struct PostsCommand {
    /// Posts subcommand to run.
    #[command(subcommand)]
    command: PostsSubcommands,
}

/// Available posts subcommands.
#[derive(Subcommand)]
enum PostsSubcommands {
    /// Reviews of a movie.
    Movie(PostsMovieArgs),
    /// Reviews written by a member (default: yourself).
    Member(PostsMemberArgs),
    /// Write a review.
    Add(PostsAddArgs),
    /// Delete one of your reviews.
    Delete(PostsDeleteArgs),
}

/// Arguments for the `posts movie` subcommand.
#[derive(clap::Args)]
struct PostsMovieArgs {
    /// TMDB movie ID.
    #[arg(long)]
    id: u64,

    /// Number of review pages to show (page size from config.toml).
    #[arg(long, default_value_t = 1)]
    pages: usize,
}

/// Arguments for the `posts member` subcommand.
#[derive(clap::Args)]
struct PostsMemberArgs {
    /// Member number. Falls back to the logged-in member if omitted.
    #[arg(long)]
    member_no: Option<u64>,
}

/// Arguments for the `posts add` subcommand.
#[derive(clap::Args)]
struct PostsAddArgs {
    /// TMDB movie ID.
    #[arg(long)]
    movie_id: u64,

    /// Star rating (1-5).
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    rating: u8,

    /// Review text.
    #[arg(long)]
    content: String,
}

/// Arguments for the `posts delete` subcommand.
#[derive(clap::Args)]
struct PostsDeleteArgs {
    /// Post ID.
    #[arg(long)]
    post_id: u64,
}

/// Arguments for the `likes` subcommand.
#[derive(clap::Args)]
struct LikesCommand {
    /// Likes subcommand to run.
    #[command(subcommand)]
    command: LikesSubcommands,
}

/// Available likes subcommands.
#[derive(Subcommand)]
enum LikesSubcommands {
    /// Like a movie, or unlike it if already liked.
    Toggle(LikeToggleArgs),
}

/// Arguments for the `likes toggle` subcommand.
#[derive(clap::Args)]
struct LikeToggleArgs {
    /// TMDB movie ID.
    #[arg(long)]
    movie_id: u64,
}

/// Arguments for the `member` subcommand.
#[derive(clap::Args)]
struct MemberCommand {
    /// Member subcommand to run.
    #[command(subcommand)]
    command: MemberSubcommands,
}

/// Available member subcommands.
#[derive(Subcommand)]
enum MemberSubcommands {
    /// Your profile.
    Profile,
    /// Another member's profile.
    Other(NicknameArgs),
    /// Check whether a nickname is taken.
    CheckNickname(NicknameArgs),
    /// Edit your nickname, phone, or password.
    Update(MemberUpdateArgs),
    /// Complete the sign-up of a social login account.
    SocialJoin(SocialJoinArgs),
    /// Delete your account.
    Delete(MemberDeleteArgs),
}

/// Arguments naming one nickname.
#[derive(clap::Args)]
struct NicknameArgs {
    /// Member nickname.
    #[arg(long)]
    nickname: String,
}

/// Arguments for the `member update` subcommand.
#[derive(clap::Args)]
struct MemberUpdateArgs {
    /// New nickname (checked for duplicates when changed).
    #[arg(long)]
    nickname: Option<String>,

    /// New phone number.
    #[arg(long)]
    phone: Option<String>,

    /// Current password, required with --new-password.
    #[arg(long, requires = "new_password")]
    current_password: Option<String>,

    /// New password.
    #[arg(long, requires = "current_password")]
    new_password: Option<String>,
}

/// Arguments for the `member social-join` subcommand.
#[derive(clap::Args)]
struct SocialJoinArgs {
    /// Real name.
    #[arg(long)]
    name: String,

    /// Phone number.
    #[arg(long)]
    phone: String,

    /// Nickname (checked for duplicates).
    #[arg(long)]
    nickname: String,
}

/// Arguments for the `member delete` subcommand.
#[derive(clap::Args)]
struct MemberDeleteArgs {
    /// Confirm the deletion.
    #[arg(long)]
    yes: bool,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Write a config.toml with default values.
    Init,
    /// Show the effective configuration.
    Show,
}

/// Which movie list to fetch.
#[derive(Debug, Clone, Copy)]
enum MovieList {
    NowPlaying,
    TopRated,
    TopLiked,
}

/// Client, session, and settings shared by the backend commands.
struct AppContext {
    /// Backend client carrying the restored session cookie.
    client: FilmlogClient,
    /// Login state, also the client's forced-logout target.
    session: Session,
    /// Where the session cookie is persisted.
    session_path: PathBuf,
    /// Page size of incremental review lists.
    page_size: usize,
}

impl AppContext {
    /// Loads config, builds the client, and restores the session cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if config or session files are unreadable, the base
    /// URL is invalid, or the client fails to build.
    fn load(dir: Option<&PathBuf>, base_url: Option<&str>) -> Result<Self> {
        let config_path = resolve_config_path(dir)?;
        let config = AppConfig::load(&config_path)?;
        let session = Session::new();

        let client = build_filmlog_client(&config, base_url, &session)?;

        let session_path = resolve_session_path(dir)?;
        restore_cookies(&session_path, &client.cookie_jar(), client.base_url())?;

        Ok(Self {
            client,
            session,
            session_path,
            page_size: config.view.page_size,
        })
    }

    /// Stores the session cookie, or clears it once the viewer is anonymous.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be written.
    fn persist_session(&self) -> Result<()> {
        if self.session.status() == AuthStatus::Anonymous {
            clear_cookies(&self.session_path)
        } else {
            save_cookies(
                &self.session_path,
                &self.client.cookie_jar(),
                self.client.base_url(),
            )
        }
    }

    /// Resolves the session and returns the logged-in member.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is logged in.
    async fn require_login(&self) -> Result<u64> {
        self.session.initialize(&self.client).await;
        self.session
            .require_member()
            .context("You must be logged in. Run `filmlog auth login` first.")
    }
}

/// Builds the backend client from config, with the session as forced-logout hook.
///
/// # Errors
///
/// Returns an error if the base URL is invalid or the client fails to build.
fn build_filmlog_client(
    config: &AppConfig,
    base_url: Option<&str>,
    session: &Session,
) -> Result<FilmlogClient> {
    let user_agent = config.api.user_agent.clone().unwrap_or_else(|| {
        String::from(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
    });

    let mut builder = FilmlogClient::builder()
        .user_agent(user_agent)
        .session_hook(Arc::new(session.clone()));

    if let Some(raw) = base_url.or(config.api.base_url.as_deref()) {
        let url = Url::parse(raw).with_context(|| format!("invalid base URL: {raw}"))?;
        builder = builder.base_url(url);
    }

    builder.build().context("failed to build filmlog API client")
}

/// Returns a token cancelled by Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            child.cancel();
        }
    });
    token
}

/// Runs the `auth login` subcommand.
///
/// # Errors
///
/// Returns an error if the credentials are rejected.
#[instrument(skip_all)]
async fn run_auth_login(ctx: &AppContext, args: &LoginArgs) -> Result<()> {
    ctx.session
        .login(&ctx.client, &args.username, &args.password)
        .await?;
    let member = ctx
        .client
        .profile()
        .await
        .context("failed to fetch profile")?;
    tracing::info!("Welcome, {} (#{})", member.member_nick, member.member_no);
    Ok(())
}

/// Runs the `auth logout` subcommand.
///
/// # Errors
///
/// Returns an error if the logout request fails (the local session is
/// cleared regardless).
#[instrument(skip_all)]
async fn run_auth_logout(ctx: &AppContext) -> Result<()> {
    ctx.session.logout(&ctx.client).await?;
    tracing::info!("Logged out.");
    Ok(())
}

/// Runs the `auth status` subcommand.
///
/// # Errors
///
/// Returns an error if the profile of a logged-in member cannot be fetched.
#[instrument(skip_all)]
async fn run_auth_status(ctx: &AppContext) -> Result<()> {
    if ctx.session.initialize(&ctx.client).await.member_no().is_none() {
        tracing::info!("Not logged in.");
        return Ok(());
    }
    let member = ctx
        .client
        .profile()
        .await
        .context("failed to fetch profile")?;
    tracing::info!(
        "Logged in as {} (#{})",
        member.member_nick,
        member.member_no
    );
    Ok(())
}

/// Runs the `movies now-playing|top-rated|top-liked` subcommands.
///
/// # Errors
///
/// Returns an error if the list or any movie's metrics cannot be fetched.
#[instrument(skip_all, fields(list = ?list))]
async fn run_movie_list(ctx: &AppContext, list: MovieList) -> Result<()> {
    ctx.session.initialize(&ctx.client).await;

    let entries = match list {
        MovieList::NowPlaying => ctx.client.now_playing().await,
        MovieList::TopRated => ctx.client.top_rated().await,
        MovieList::TopLiked => ctx.client.top_liked().await,
    }
    .with_context(|| format!("failed to fetch {list:?} movies"))?;

    let cancel = cancel_on_ctrl_c();
    let Some(movies) = load_movie_list(&ctx.client, &ctx.session, entries, &cancel).await? else {
        tracing::warn!("Cancelled.");
        return Ok(());
    };
    output::render_movie_table(&movies);
    Ok(())
}

/// Runs the `movies show` subcommand.
///
/// # Errors
///
/// Returns an error if the movie or its metrics cannot be fetched.
#[instrument(skip_all, fields(movie_id = args.id))]
async fn run_movies_show(ctx: &AppContext, args: &MovieIdArgs) -> Result<()> {
    let viewer = ctx.session.initialize(&ctx.client).await.member_no();

    let movie = ctx
        .client
        .movie(args.id)
        .await
        .with_context(|| format!("failed to fetch movie {}", args.id))?;
    let (entry, posts) = enrich_movie_with_posts(&ctx.client, viewer, movie).await?;

    output::render_movie_detail(&entry, &posts, viewer);
    Ok(())
}

/// Runs the `movies trailer` subcommand.
///
/// # Errors
///
/// Returns an error if the videos request fails.
#[instrument(skip_all, fields(movie_id = args.id))]
async fn run_movies_trailer(ctx: &AppContext, args: &MovieIdArgs) -> Result<()> {
    match random_trailer(&ctx.client, args.id).await? {
        Some(video) => {
            let url = video
                .watch_url()
                .unwrap_or_else(|| format!("{} video {}", video.site, video.key));
            tracing::info!("{}\t{}", video.name, url);
        }
        None => tracing::info!("No trailer available."),
    }
    Ok(())
}

/// Runs the `movies search` subcommand.
///
/// # Errors
///
/// Returns an error if a search page or its enrichment fails.
#[instrument(skip_all)]
async fn run_movies_search(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    ctx.session.initialize(&ctx.client).await;

    let cancel = cancel_on_ctrl_c();
    let mut feed = SearchFeed::new(&args.keyword);
    for _ in 0..args.pages {
        if feed.load_next(&ctx.client, &ctx.session, &cancel).await? == 0 {
            break;
        }
    }

    output::render_movie_table(feed.results());
    if feed.has_more() {
        tracing::info!(
            "More results may exist (use --pages {}).",
            args.pages.saturating_add(1)
        );
    }
    Ok(())
}

/// Runs the `posts movie` subcommand.
///
/// # Errors
///
/// Returns an error if the configured page size is 0.
#[instrument(skip_all, fields(movie_id = args.id))]
async fn run_posts_movie(ctx: &AppContext, args: &PostsMovieArgs) -> Result<()> {
    let viewer = ctx.session.initialize(&ctx.client).await.member_no();

    let posts = posts_by_movie_or_empty(&ctx.client, args.id).await;
    let mut list = IncrementalList::new(posts, ctx.page_size)?;
    for _ in 1..args.pages {
        let sentinel = list.sentinel();
        if !list.on_intersect(sentinel) {
            break;
        }
    }

    output::render_posts(list.visible(), viewer);
    if list.has_more() {
        tracing::info!(
            "Showing {}/{} reviews (use --pages {}).",
            list.visible_len(),
            list.len(),
            args.pages.saturating_add(1)
        );
    }
    Ok(())
}

/// Runs the `posts member` subcommand.
///
/// # Errors
///
/// Returns an error if no member number is given and nobody is logged in.
#[instrument(skip_all)]
async fn run_posts_member(ctx: &AppContext, args: &PostsMemberArgs) -> Result<()> {
    let viewer = ctx.session.initialize(&ctx.client).await.member_no();
    let member_no = args
        .member_no
        .or(viewer)
        .context("--member-no is required when not logged in")?;

    let posts = posts_by_member_or_empty(&ctx.client, member_no).await;
    output::render_posts(&posts, viewer);
    Ok(())
}

/// Runs the `posts add` subcommand.
///
/// # Errors
///
/// Returns an error if nobody is logged in, the rating is out of range, or
/// the backend rejects the review.
#[instrument(skip_all, fields(movie_id = args.movie_id))]
async fn run_posts_add(ctx: &AppContext, args: &PostsAddArgs) -> Result<()> {
    ctx.require_login().await?;
    let member = ctx
        .client
        .profile()
        .await
        .context("failed to fetch profile")?;

    let post = NewPost::new(
        args.content.as_str(),
        args.rating,
        args.movie_id,
        member.member_nick,
    )?;
    ctx.client
        .register_post(&post)
        .await
        .context("failed to register review")?;
    tracing::info!("Review posted.");
    Ok(())
}

/// Runs the `posts delete` subcommand.
///
/// # Errors
///
/// Returns an error if nobody is logged in, the post belongs to someone
/// else, or the delete request fails.
#[instrument(skip_all, fields(post_id = args.post_id))]
async fn run_posts_delete(ctx: &AppContext, args: &PostsDeleteArgs) -> Result<()> {
    let member_no = ctx.require_login().await?;

    let own_posts = ctx
        .client
        .posts_by_member(member_no)
        .await
        .context("failed to fetch your reviews")?;
    if !own_posts
        .iter()
        .any(|post| post.post_id == args.post_id && post.is_owned_by(Some(member_no)))
    {
        bail!("Only your own reviews can be deleted.");
    }

    ctx.client
        .delete_post(args.post_id)
        .await
        .context("failed to delete review")?;
    tracing::info!("Review {} deleted.", args.post_id);
    Ok(())
}

/// Runs the `likes toggle` subcommand.
///
/// # Errors
///
/// Returns an error if nobody is logged in or a request fails.
#[instrument(skip_all, fields(movie_id = args.movie_id))]
async fn run_likes_toggle(ctx: &AppContext, args: &LikeToggleArgs) -> Result<()> {
    let viewer = ctx.session.initialize(&ctx.client).await.member_no();

    let movie = ctx
        .client
        .movie(args.movie_id)
        .await
        .with_context(|| format!("failed to fetch movie {}", args.movie_id))?;
    let mut entry = enrich_movie(&ctx.client, viewer, movie).await?;

    match toggle_like(&ctx.client, &ctx.session, &mut entry).await? {
        LikeOutcome::NotLoggedIn => bail!("You must be logged in to like a movie."),
        LikeOutcome::Liked => tracing::info!(
            "Liked {} ({} likes)",
            entry.movie.title,
            entry.likes_count
        ),
        LikeOutcome::Unliked => tracing::info!(
            "Unliked {} ({} likes)",
            entry.movie.title,
            entry.likes_count
        ),
    }
    Ok(())
}

/// Runs the `member profile` subcommand.
///
/// # Errors
///
/// Returns an error if nobody is logged in or the profile cannot be fetched.
#[instrument(skip_all)]
async fn run_member_profile(ctx: &AppContext) -> Result<()> {
    ctx.session.initialize(&ctx.client).await;
    let cancel = cancel_on_ctrl_c();
    let Some(view) = load_own_profile(&ctx.client, &ctx.session, &cancel).await? else {
        bail!("You must be logged in to view your profile.");
    };
    output::render_profile(&view, ctx.session.member_no());
    Ok(())
}

/// Runs the `member other` subcommand.
///
/// # Errors
///
/// Returns an error if nobody is logged in or the profile cannot be fetched.
#[instrument(skip_all)]
async fn run_member_other(ctx: &AppContext, args: &NicknameArgs) -> Result<()> {
    ctx.session.initialize(&ctx.client).await;
    let cancel = cancel_on_ctrl_c();
    let Some(view) = load_other_profile(&ctx.client, &ctx.session, &args.nickname, &cancel).await?
    else {
        bail!("You must be logged in to view member profiles.");
    };
    output::render_profile(&view, ctx.session.member_no());
    Ok(())
}

/// Runs the `member check-nickname` subcommand.
///
/// # Errors
///
/// Returns an error if the nickname is blank.
#[instrument(skip_all)]
async fn run_member_check_nickname(ctx: &AppContext, args: &NicknameArgs) -> Result<()> {
    if args.nickname.trim().is_empty() {
        return Err(GateError::EmptyNickname.into());
    }
    if nickname_duplicate_or_false(&ctx.client, &args.nickname).await {
        tracing::info!("Nickname {} is already taken.", args.nickname);
    } else {
        tracing::info!("Nickname {} is available.", args.nickname);
    }
    Ok(())
}

/// Runs the `member update` subcommand.
///
/// A changed nickname is checked for duplicates before the update is sent.
///
/// # Errors
///
/// Returns an error if nobody is logged in, the nickname is taken, the
/// current password is wrong, or the update fails.
#[instrument(skip_all)]
async fn run_member_update(ctx: &AppContext, args: &MemberUpdateArgs) -> Result<()> {
    ctx.require_login().await?;
    let member = ctx
        .client
        .profile()
        .await
        .context("failed to fetch profile")?;

    let nickname = args
        .nickname
        .clone()
        .unwrap_or_else(|| member.member_nick.clone());
    let mut gate = NicknameGate::new(CheckPolicy::OnChange {
        original: member.member_nick.clone(),
    });
    if nickname != member.member_nick {
        gate.check(&ctx.client, &nickname).await?;
    }

    let form = ProfileEditForm {
        member_no: member.member_no,
        nickname,
        phone: args.phone.clone().unwrap_or(member.member_phone),
        current_password: args.current_password.clone(),
        new_password: args.new_password.clone(),
    };
    let message = submit_profile_edit(&ctx.client, &gate, form)
        .await
        .context("회원 정보 수정에 실패했습니다.")?;
    tracing::info!("{}", message.message);
    Ok(())
}

/// Runs the `member social-join` subcommand.
///
/// # Errors
///
/// Returns an error if nobody is logged in, the nickname is taken, or the
/// join fails.
#[instrument(skip_all)]
async fn run_member_social_join(ctx: &AppContext, args: &SocialJoinArgs) -> Result<()> {
    ctx.require_login().await?;
    let member = ctx
        .client
        .profile()
        .await
        .context("failed to fetch profile")?;

    let mut gate = NicknameGate::new(CheckPolicy::Always);
    gate.check(&ctx.client, &args.nickname).await?;

    let form = SocialJoinForm {
        member_email: member.member_email,
        member_name: args.name.clone(),
        member_phone: args.phone.clone(),
        member_nick: args.nickname.clone(),
    };
    let message = submit_social_join(&ctx.client, &gate, &form)
        .await
        .context("추가 정보 입력에 실패했습니다.")?;
    tracing::info!("{}", message.message);
    Ok(())
}

/// Runs the `member delete` subcommand.
///
/// # Errors
///
/// Returns an error without `--yes`, if nobody is logged in, or if the
/// delete request fails.
#[instrument(skip_all)]
async fn run_member_delete(ctx: &AppContext, args: &MemberDeleteArgs) -> Result<()> {
    if !args.yes {
        bail!("Refusing to delete the account without --yes.");
    }
    let member_no = ctx.require_login().await?;

    delete_member_image_quietly(&ctx.client, member_no).await;
    let message = ctx
        .client
        .delete_member(member_no)
        .await
        .context("회원 탈퇴에 실패했습니다.")?;
    ctx.session.set_anonymous();
    tracing::info!("{}", message.message);
    Ok(())
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if the now-playing list cannot be loaded or the TUI fails.
#[instrument(skip_all)]
async fn run_browse(ctx: &AppContext) -> Result<()> {
    ctx.session.initialize(&ctx.client).await;

    tracing::info!("Loading now-playing movies...");
    let entries = ctx
        .client
        .now_playing()
        .await
        .context("failed to fetch now-playing movies")?;
    let cancel = cancel_on_ctrl_c();
    let Some(movies) = load_movie_list(&ctx.client, &ctx.session, entries, &cancel).await? else {
        tracing::warn!("Cancelled.");
        return Ok(());
    };

    tui::run_browser(&ctx.client, &ctx.session, movies, ctx.page_size).await
}

/// Combines a command result with the session write that follows it.
///
/// The command's own error wins; a failed write is only logged then.
fn settle_command(result: Result<()>, persisted: Result<()>) -> Result<()> {
    match result {
        Ok(()) => persisted.context("failed to save session"),
        Err(err) => {
            if let Err(persist_err) = persisted {
                tracing::error!(error = %persist_err, "failed to save session");
            }
            Err(err)
        }
    }
}

/// Runs the `config init` subcommand.
///
/// # Errors
///
/// Returns an error if config.toml already exists or cannot be written.
fn run_config_init(dir: Option<&PathBuf>, base_url: Option<&str>) -> Result<()> {
    let path = resolve_config_path(dir)?;
    if path.exists() {
        bail!("{} already exists", path.display());
    }

    let mut config = AppConfig::default();
    config.api.base_url = base_url.map(String::from);
    config.save(&path)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if config.toml exists but cannot be parsed.
fn run_config_show(dir: Option<&PathBuf>, base_url: Option<&str>) -> Result<()> {
    let path = resolve_config_path(dir)?;
    let config = AppConfig::load(&path)?;

    tracing::info!("Config:\t{}", path.display());
    tracing::info!(
        "base_url:\t{}",
        base_url
            .or(config.api.base_url.as_deref())
            .unwrap_or("(default)")
    );
    tracing::info!(
        "user_agent:\t{}",
        config.api.user_agent.as_deref().unwrap_or("(default)")
    );
    tracing::info!("page_size:\t{}", config.view.page_size);
    Ok(())
}

/// Dispatches a backend command.
async fn run_command(ctx: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Auth(cmd) => match cmd.command {
            AuthSubcommands::Login(args) => run_auth_login(ctx, &args).await,
            AuthSubcommands::Logout => run_auth_logout(ctx).await,
            AuthSubcommands::Status => run_auth_status(ctx).await,
        },
        Commands::Movies(cmd) => match cmd.command {
            MoviesSubcommands::NowPlaying => run_movie_list(ctx, MovieList::NowPlaying).await,
            MoviesSubcommands::TopRated => run_movie_list(ctx, MovieList::TopRated).await,
            MoviesSubcommands::TopLiked => run_movie_list(ctx, MovieList::TopLiked).await,
            MoviesSubcommands::Show(args) => run_movies_show(ctx, &args).await,
            MoviesSubcommands::Trailer(args) => run_movies_trailer(ctx, &args).await,
            MoviesSubcommands::Search(args) => run_movies_search(ctx, &args).await,
        },
        Commands::Posts(cmd) => match cmd.command {
            PostsSubcommands::Movie(args) => run_posts_movie(ctx, &args).await,
            PostsSubcommands::Member(args) => run_posts_member(ctx, &args).await,
            PostsSubcommands::Add(args) => run_posts_add(ctx, &args).await,
            PostsSubcommands::Delete(args) => run_posts_delete(ctx, &args).await,
        },
        Commands::Likes(cmd) => match cmd.command {
            LikesSubcommands::Toggle(args) => run_likes_toggle(ctx, &args).await,
        },
        Commands::Member(cmd) => match cmd.command {
            MemberSubcommands::Profile => run_member_profile(ctx).await,
            MemberSubcommands::Other(args) => run_member_other(ctx, &args).await,
            MemberSubcommands::CheckNickname(args) => run_member_check_nickname(ctx, &args).await,
            MemberSubcommands::Update(args) => run_member_update(ctx, &args).await,
            MemberSubcommands::SocialJoin(args) => run_member_social_join(ctx, &args).await,
            MemberSubcommands::Delete(args) => run_member_delete(ctx, &args).await,
        },
        Commands::Browse => run_browse(ctx).await,
        Commands::Config(_) => bail!("config commands do not use the backend"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let dir = cli.dir.as_ref();
    let base_url = cli.base_url.as_deref();
    match cli.command {
        Commands::Config(cmd) => match cmd.command {
            ConfigSubcommands::Init => run_config_init(dir, base_url),
            ConfigSubcommands::Show => run_config_show(dir, base_url),
        },
        command => {
            let ctx = AppContext::load(dir, base_url)?;
            let result = run_command(&ctx, command).await;
            settle_command(result, ctx.persist_session())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_settle_command_keeps_command_error() {
        // Arrange
        let result = Err(anyhow!("You must be logged in."));
        let persisted = Err(anyhow!("permission denied"));

        // Act
        let err = settle_command(result, persisted).unwrap_err();

        // Assert
        assert_eq!(err.to_string(), "You must be logged in.");
    }

    #[test]
    fn test_settle_command_reports_failed_save_after_success() {
        // Arrange
        let persisted = Err(anyhow!("permission denied"));

        // Act
        let err = settle_command(Ok(()), persisted).unwrap_err();

        // Assert
        assert_eq!(err.to_string(), "failed to save session");
    }

    #[test]
    fn test_settle_command_success() {
        // Arrange & Act & Assert
        assert!(settle_command(Ok(()), Ok(())).is_ok());
    }
}
