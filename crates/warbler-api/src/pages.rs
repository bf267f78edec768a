//! Server-rendered HTML built with maud, which escapes every spliced value.

use axum::{
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use maud::{DOCTYPE, Markup, html};

use warbler_types::api::{ProfileForm, SignupForm};
use warbler_types::flash::Flash;
use warbler_types::models::{Message, User, UserCounts};

use crate::flash::take_flashes;

/// 302 Found, matching what browsers and form posts expect after a mutation.
pub fn found(location: impl Into<String>) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.into())]).into_response()
}

/// Render a page, consuming any pending flashes into it.
pub fn render(jar: CookieJar, page: impl FnOnce(&[Flash]) -> Markup) -> (CookieJar, Html<String>) {
    let (jar, flashes) = take_flashes(jar);
    let html = page(&flashes);
    (jar, Html(html.into_string()))
}

fn layout(title: &str, user: Option<&User>, flashes: &[Flash], body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { (title) }
                link rel="stylesheet" href="/static/stylesheets/style.css";
            }
            body {
                nav class="navbar" {
                    a href="/" class="navbar-brand" { span { "Warbler" } }
                    ul class="nav" {
                        li {
                            form class="navbar-form" action="/users" {
                                input name="q" placeholder="Search Warbler";
                                button { "Search" }
                            }
                        }
                        @if let Some(u) = user {
                            li { a href={ "/users/" (u.id) } { img src=(u.image_url) alt=(u.username); } }
                            li { a href="/messages/new" { "New Message" } }
                            li { a href="/logout" { "Log out" } }
                        } @else {
                            li { a href="/signup" { "Sign up" } }
                            li { a href="/login" { "Log in" } }
                        }
                    }
                }
                div class="container" {
                    @for f in flashes {
                        div class={ "alert alert-" (f.category.as_str()) } { (f.message) }
                    }
                    (body)
                }
            }
        }
    }
}

fn errors_list(errors: &[String]) -> Markup {
    html! {
        @if !errors.is_empty() {
            ul class="form-errors" {
                @for e in errors {
                    li { (e) }
                }
            }
        }
    }
}

fn opt(value: Option<&String>) -> &str {
    value.map(String::as_str).unwrap_or_default()
}

fn message_list(messages: &[Message], liked: &[i64], viewer: Option<&User>) -> Markup {
    html! {
        ul class="messages" {
            @for m in messages {
                li class="message" {
                    a href={ "/users/" (m.user_id) } { img src=(m.image_url) alt="" class="timeline-image"; }
                    div class="message-area" {
                        a href={ "/users/" (m.user_id) } { "@" (m.username) }
                        span class="text-muted" { (m.timestamp.format("%d %B %Y").to_string()) }
                        p { a href={ "/messages/" (m.id) } { (m.text) } }
                    }
                    @if let Some(v) = viewer {
                        @if v.id != m.user_id {
                            form method="POST" action={ "/users/add_like/" (m.id) } class="messages-like" {
                                button class=(if liked.contains(&m.id) { "liked" } else { "not-liked" }) { "★" }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn user_cards(users: &[User]) -> Markup {
    html! {
        @if users.is_empty() {
            h3 { "Sorry, no users found" }
        } @else {
            div class="user-cards" {
                @for u in users {
                    div class="card user-card" {
                        a href={ "/users/" (u.id) } {
                            img src=(u.image_url) alt={ "Image for " (u.username) };
                            p { "@" (u.username) }
                        }
                        p class="card-bio" { (opt(u.bio.as_ref())) }
                    }
                }
            }
        }
    }
}

/// Profile header plus the tab content below it.
fn profile(viewer: Option<&User>, user: &User, counts: &UserCounts, is_following: bool, content: Markup) -> Markup {
    let is_self = viewer.is_some_and(|v| v.id == user.id);
    html! {
        div class="profile-header" style={ "background-image: url('" (user.header_image_url) "')" } {}
        img src=(user.image_url) alt={ "Image for " (user.username) } class="profile-avatar";
        h4 { "@" (user.username) }
        p class="profile-bio" { (opt(user.bio.as_ref())) }
        p class="profile-location" { (opt(user.location.as_ref())) }
        ul class="user-stats" {
            li { "Messages " a href={ "/users/" (user.id) } { (counts.messages) } }
            li { "Following " a href={ "/users/" (user.id) "/following" } { (counts.following) } }
            li { "Followers " a href={ "/users/" (user.id) "/followers" } { (counts.followers) } }
            li { "Likes " a href={ "/users/" (user.id) "/likes" } { (counts.likes) } }
        }
        div class="profile-actions" {
            @if is_self {
                a href="/users/profile" class="btn" { "Edit Profile" }
                form method="POST" action="/users/delete" {
                    button class="btn btn-danger" { "Delete Profile" }
                }
            } @else if viewer.is_some() {
                @if is_following {
                    form method="POST" action={ "/users/stop-following/" (user.id) } {
                        button class="btn" { "Unfollow" }
                    }
                } @else {
                    form method="POST" action={ "/users/follow/" (user.id) } {
                        button class="btn" { "Follow" }
                    }
                }
            }
        }
        div class="profile-content" { (content) }
    }
}

// -- Home --

pub fn home_anon(flashes: &[Flash]) -> Markup {
    let body = html! {
        div class="home-hero" {
            h1 { "What's Happening?" }
            h4 { "New to Warbler?" }
            a href="/signup" class="btn btn-primary" { "Sign up now" }
        }
    };
    layout("Warbler", None, flashes, body)
}

pub fn home(user: &User, counts: &UserCounts, messages: &[Message], liked: &[i64], flashes: &[Flash]) -> Markup {
    let body = html! {
        aside class="user-aside" {
            a href={ "/users/" (user.id) } { img src=(user.image_url) alt={ "Image for " (user.username) }; }
            p { "@" (user.username) }
            ul class="user-stats" {
                li { "Messages " a href={ "/users/" (user.id) } { (counts.messages) } }
                li { "Following " a href={ "/users/" (user.id) "/following" } { (counts.following) } }
                li { "Followers " a href={ "/users/" (user.id) "/followers" } { (counts.followers) } }
            }
        }
        div class="timeline" { (message_list(messages, liked, Some(user))) }
    };
    layout("Warbler", Some(user), flashes, body)
}

// -- Auth --

pub fn signup(form: &SignupForm, errors: &[String], flashes: &[Flash]) -> Markup {
    let body = html! {
        h2 class="join-message" { "Join Warbler today." }
        (errors_list(errors))
        form method="POST" action="/signup" id="user_form" {
            input name="username" placeholder="Username" value=(form.username);
            input name="email" placeholder="E-mail" value=(form.email);
            input name="password" type="password" placeholder="Password";
            input name="image_url" placeholder="(Optional) Image URL" value=(opt(form.image_url.as_ref()));
            button class="btn btn-primary" { "Sign me up!" }
        }
    };
    layout("Sign up", None, flashes, body)
}

pub fn login(username: &str, errors: &[String], flashes: &[Flash]) -> Markup {
    let body = html! {
        h2 class="join-message" { "Welcome back." }
        (errors_list(errors))
        form method="POST" action="/login" id="user_form" {
            input name="username" placeholder="Username" value=(username);
            input name="password" type="password" placeholder="Password";
            button class="btn btn-primary" { "Log in" }
        }
    };
    layout("Log in", None, flashes, body)
}

// -- Users --

pub fn users_index(viewer: Option<&User>, users: &[User], flashes: &[Flash]) -> Markup {
    layout("Users", viewer, flashes, user_cards(users))
}

pub fn user_show(
    viewer: Option<&User>,
    user: &User,
    counts: &UserCounts,
    is_following: bool,
    messages: &[Message],
    liked: &[i64],
    flashes: &[Flash],
) -> Markup {
    let body = profile(viewer, user, counts, is_following, message_list(messages, liked, viewer));
    layout(&user.username, viewer, flashes, body)
}

/// Following/followers tab.
pub fn follow_list(
    viewer: &User,
    user: &User,
    counts: &UserCounts,
    is_following: bool,
    title: &str,
    users: &[User],
    flashes: &[Flash],
) -> Markup {
    let content = html! {
        h3 { (title) }
        (user_cards(users))
    };
    let body = profile(Some(viewer), user, counts, is_following, content);
    layout(title, Some(viewer), flashes, body)
}

pub fn likes(
    viewer: &User,
    user: &User,
    counts: &UserCounts,
    is_following: bool,
    messages: &[Message],
    liked: &[i64],
    flashes: &[Flash],
) -> Markup {
    let content = html! {
        h3 { "Likes" }
        (message_list(messages, liked, Some(viewer)))
    };
    let body = profile(Some(viewer), user, counts, is_following, content);
    layout("Likes", Some(viewer), flashes, body)
}

pub fn profile_edit(user: &User, form: &ProfileForm, errors: &[String], flashes: &[Flash]) -> Markup {
    let body = html! {
        h2 class="join-message" { "Edit Your Profile." }
        (errors_list(errors))
        form method="POST" action="/users/profile" id="user_form" {
            input name="username" placeholder="Username" value=(form.username);
            input name="email" placeholder="E-mail" value=(form.email);
            input name="image_url" placeholder="(Optional) Image URL" value=(opt(form.image_url.as_ref()));
            input name="header_image_url" placeholder="(Optional) Header Image URL"
                value=(opt(form.header_image_url.as_ref()));
            textarea name="bio" placeholder="(Optional) Tell us about yourself" { (opt(form.bio.as_ref())) }
            input name="location" placeholder="(Optional) Location" value=(opt(form.location.as_ref()));
            p { "To confirm changes, enter your password:" }
            input name="password" type="password" placeholder="Password";
            button class="btn btn-success" { "Edit this user!" }
            a href={ "/users/" (user.id) } class="btn btn-outline-secondary" { "Cancel" }
        }
    };
    layout("Edit Profile", Some(user), flashes, body)
}

// -- Messages --

pub fn message_new(user: &User, text: &str, errors: &[String], flashes: &[Flash]) -> Markup {
    let body = html! {
        (errors_list(errors))
        form method="POST" action="/messages/new" {
            textarea name="text" placeholder="What's happening?" maxlength="140" { (text) }
            button class="btn btn-outline-success" { "Add my message!" }
        }
    };
    layout("New Message", Some(user), flashes, body)
}

pub fn message_show(viewer: Option<&User>, message: &Message, liked: &[i64], flashes: &[Flash]) -> Markup {
    let is_author = viewer.is_some_and(|v| v.id == message.user_id);
    let body = html! {
        (message_list(std::slice::from_ref(message), liked, viewer))
        @if is_author {
            form method="POST" action={ "/messages/" (message.id) "/delete" } {
                button class="btn btn-outline-danger" { "Delete" }
            }
        }
    };
    layout("Message", viewer, flashes, body)
}

// -- Errors --

pub fn not_found(viewer: Option<&User>, flashes: &[Flash]) -> Markup {
    let body = html! {
        h1 { "404" }
        p { "Sorry, that page doesn't exist." }
        a href="/" { "Go home" }
    };
    layout("Page not found", viewer, flashes, body)
}

pub fn error_page(status: StatusCode, message: &str) -> Markup {
    let body = html! {
        h1 { (status.as_u16()) }
        p { (message) }
        a href="/" { "Go home" }
    };
    layout("Error", None, &[], body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warbler_types::flash::FlashCategory;

    fn user(username: &str) -> User {
        User {
            id: 7,
            email: "e@e.com".into(),
            username: username.into(),
            image_url: "x".into(),
            header_image_url: "y".into(),
            bio: None,
            location: None,
        }
    }

    #[test]
    fn test_layout_renders_flashes() {
        let flashes = vec![Flash::new(FlashCategory::Danger, "Access unauthorized.")];
        let html = home_anon(&flashes).into_string();
        assert!(html.contains(r#"<div class="alert alert-danger">Access unauthorized.</div>"#));
        assert!(html.contains("/signup"));
    }

    #[test]
    fn test_user_content_is_escaped() {
        let html = users_index(None, &[user("<script>")], &[]).into_string();
        assert!(!html.contains("<script>"));
        assert!(html.contains("@&lt;script&gt;"));
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let form = SignupForm {
            username: r#""><b>x"#.into(),
            ..SignupForm::default()
        };
        let html = signup(&form, &[], &[]).into_string();
        assert!(!html.contains("<b>x"));
        assert!(html.contains("&quot;&gt;&lt;b&gt;x"));
    }

    #[test]
    fn test_profile_actions_depend_on_viewer() {
        let owner = user("owner");
        let mut other = user("other");
        other.id = 8;
        let counts = UserCounts::default();

        let own = user_show(Some(&owner), &owner, &counts, false, &[], &[], &[]).into_string();
        assert!(own.contains("/users/delete"));
        assert!(!own.contains("/users/follow/"));

        let theirs = user_show(Some(&other), &owner, &counts, false, &[], &[], &[]).into_string();
        assert!(theirs.contains("/users/follow/7"));

        let following = user_show(Some(&other), &owner, &counts, true, &[], &[], &[]).into_string();
        assert!(following.contains("/users/stop-following/7"));

        let anon = user_show(None, &owner, &counts, false, &[], &[], &[]).into_string();
        assert!(!anon.contains("/users/follow/"));
        assert!(!anon.contains("/users/delete"));
    }
}
