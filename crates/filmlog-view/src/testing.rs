//! In-memory backend shared by the unit tests.
#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]

use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Result, bail};
use filmlog_api::types::{
    ApiMessage, AuthCheck, LikeUpdate, Member, MemberMessage, MemberUpdate, Movie, MovieEntry,
    MovieImage, NewPost, Post, SocialJoinForm, Video,
};
use filmlog_api::{LocalAuthApi, LocalLikeApi, LocalMemberApi, LocalMovieApi, LocalPostApi};

/// Canned backend with per-endpoint call counters.
#[derive(Debug, Default)]
pub struct MockBackend {
    /// Member returned by `check_auth`; `None` fails the call.
    pub auth_member: Option<u64>,
    /// Fail every mutating call.
    pub fail_mutations: bool,
    /// Fail `check_nickname` and `verify_password`.
    pub fail_reads: bool,
    /// All posts, filtered per request.
    pub posts: Vec<Post>,
    /// Movie ids liked by the viewer (and returned as liked movies).
    pub liked: Vec<u64>,
    /// `(movie_id, count)` pairs; missing ids count 0.
    pub like_counts: Vec<(u64, u64)>,
    /// Movie whose posts request fails.
    pub fail_posts_for: Option<u64>,
    /// Movie ids whose detail request fails.
    pub missing_movies: Vec<u64>,
    /// Profile image bytes.
    pub image: Option<Vec<u8>>,
    /// Nicknames reported as duplicates.
    pub taken_nicknames: Vec<String>,
    /// The viewer's password.
    pub password: String,
    /// Search result pages, page 1 first.
    pub search_pages: Vec<Vec<Movie>>,

    pub logout_calls: AtomicU32,
    pub status_calls: AtomicU32,
    pub count_calls: AtomicU32,
    pub movie_calls: AtomicU32,
    pub update_like_calls: AtomicU32,
    pub check_nickname_calls: AtomicU32,
    pub update_member_calls: AtomicU32,
    pub social_join_calls: AtomicU32,
    pub other_profile_calls: AtomicU32,
    pub search_calls: AtomicU32,
    pub posts_calls: AtomicU32,
}

fn hit(counter: &AtomicU32) {
    counter.fetch_add(1, Ordering::SeqCst);
}

impl MockBackend {
    fn mutation(&self) -> Result<()> {
        if self.fail_mutations {
            bail!("backend rejected the request");
        }
        Ok(())
    }
}

/// Minimal movie with the given id.
pub fn make_movie(id: u64) -> Movie {
    Movie {
        id,
        title: format!("Movie {id}"),
        poster_path: Some(format!("/poster-{id}.jpg")),
        overview: None,
        release_date: Some(String::from("2024-09-01")),
        vote_average: Some(7.5),
        runtime: None,
    }
}

/// Post with the given ids and rating.
pub fn make_post(post_id: u64, movie_id: u64, member_no: u64, rating_star: u8) -> Post {
    Post {
        post_id,
        member_no,
        member_nick: format!("member-{member_no}"),
        movie_id,
        rating_star,
        post_content: Some(format!("Review {post_id}")),
        reg_date: String::from("2024-09-01"),
    }
}

impl LocalAuthApi for MockBackend {
    async fn login(&self, _username: &str, _password: &str) -> Result<serde_json::Value> {
        self.mutation()?;
        Ok(serde_json::Value::Null)
    }

    async fn logout(&self) -> Result<()> {
        hit(&self.logout_calls);
        self.mutation()
    }

    async fn check_auth(&self) -> Result<AuthCheck> {
        match self.auth_member {
            Some(member_no) => Ok(AuthCheck {
                member_no,
                member_nick: None,
            }),
            None => bail!("401 Unauthorized"),
        }
    }

    async fn refresh_token(&self) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }
}

impl LocalMemberApi for MockBackend {
    async fn profile(&self) -> Result<Member> {
        Ok(Member {
            member_no: self.auth_member.unwrap_or(7),
            member_nick: String::from("popcorn"),
            ..Member::default()
        })
    }

    async fn update_member(&self, update: &MemberUpdate) -> Result<MemberMessage> {
        hit(&self.update_member_calls);
        self.mutation()?;
        Ok(MemberMessage {
            message: String::from("수정 완료"),
            member: Some(Member {
                member_no: update.member_no,
                member_nick: update.member_nick.clone(),
                member_phone: update.member_phone.clone(),
                ..Member::default()
            }),
        })
    }

    async fn check_nickname(&self, nickname: &str) -> Result<bool> {
        hit(&self.check_nickname_calls);
        if self.fail_reads {
            bail!("backend unavailable");
        }
        Ok(self.taken_nicknames.iter().any(|taken| taken == nickname))
    }

    async fn verify_password(&self, password: &str) -> Result<bool> {
        if self.fail_reads {
            bail!("backend unavailable");
        }
        Ok(self.password == password)
    }

    async fn other_profile(&self, nickname: &str) -> Result<Member> {
        hit(&self.other_profile_calls);
        Ok(Member {
            member_no: 8,
            member_nick: String::from(nickname),
            ..Member::default()
        })
    }

    async fn social_join(&self, form: &SocialJoinForm) -> Result<MemberMessage> {
        hit(&self.social_join_calls);
        self.mutation()?;
        Ok(MemberMessage {
            message: format!("{} 가입 완료", form.member_nick),
            member: None,
        })
    }

    async fn delete_member(&self, _member_no: u64) -> Result<ApiMessage> {
        self.mutation()?;
        Ok(ApiMessage::default())
    }

    async fn member_image(&self, _member_no: u64) -> Result<Option<Vec<u8>>> {
        Ok(self.image.clone())
    }

    async fn delete_member_image(&self, _member_no: u64) -> Result<()> {
        self.mutation()
    }
}

impl LocalMovieApi for MockBackend {
    async fn now_playing(&self) -> Result<Vec<MovieEntry>> {
        Ok(self.liked.iter().map(|&id| MovieEntry::Movie(make_movie(id))).collect())
    }

    async fn top_rated(&self) -> Result<Vec<MovieEntry>> {
        Ok(self.liked.iter().map(|&id| MovieEntry::Id(id)).collect())
    }

    async fn top_liked(&self) -> Result<Vec<MovieEntry>> {
        Ok(vec![])
    }

    async fn movie(&self, movie_id: u64) -> Result<Movie> {
        hit(&self.movie_calls);
        if self.missing_movies.contains(&movie_id) {
            bail!("404 Not Found: movie {movie_id}");
        }
        Ok(make_movie(movie_id))
    }

    async fn videos(&self, _movie_id: u64) -> Result<Vec<Video>> {
        Ok(vec![])
    }

    async fn images(&self, _movie_id: u64) -> Result<Vec<MovieImage>> {
        Ok(vec![])
    }

    async fn liked_movies(&self, _member_no: u64) -> Result<Vec<u64>> {
        Ok(self.liked.clone())
    }

    async fn search(&self, _keyword: &str, page: u32) -> Result<Vec<Movie>> {
        hit(&self.search_calls);
        let index = usize::try_from(page).unwrap().saturating_sub(1);
        Ok(self.search_pages.get(index).cloned().unwrap_or_default())
    }
}

impl LocalPostApi for MockBackend {
    async fn posts_by_movie(&self, movie_id: u64) -> Result<Vec<Post>> {
        hit(&self.posts_calls);
        if self.fail_posts_for == Some(movie_id) {
            bail!("500 Internal Server Error");
        }
        Ok(self
            .posts
            .iter()
            .filter(|post| post.movie_id == movie_id)
            .cloned()
            .collect())
    }

    async fn posts_by_member(&self, member_no: u64) -> Result<Vec<Post>> {
        Ok(self
            .posts
            .iter()
            .filter(|post| post.member_no == member_no)
            .cloned()
            .collect())
    }

    async fn average_rating(&self, movie_id: u64) -> Result<f64> {
        let posts = self.posts_by_movie(movie_id).await?;
        Ok(crate::rating::average_rating(&posts))
    }

    async fn register_post(&self, _post: &NewPost) -> Result<()> {
        self.mutation()
    }

    async fn delete_post(&self, _post_id: u64) -> Result<()> {
        self.mutation()
    }
}

impl LocalLikeApi for MockBackend {
    async fn like_status(&self, _member_no: u64, movie_id: u64) -> Result<bool> {
        hit(&self.status_calls);
        Ok(self.liked.contains(&movie_id))
    }

    async fn like_count(&self, movie_id: u64) -> Result<u64> {
        hit(&self.count_calls);
        Ok(self
            .like_counts
            .iter()
            .find(|(id, _)| *id == movie_id)
            .map_or(0, |(_, count)| *count))
    }

    async fn update_like(&self, _update: &LikeUpdate) -> Result<()> {
        hit(&self.update_like_calls);
        self.mutation()
    }
}
