use anyhow::Context;
use errorly_client::{
    api::{AuthToken, CommentId, Post, PostId, Target},
    parse_tags, walk, Direction, HttpGateway, Layout, Order, Session,
};

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(long, env = "ERRORLY_HOST", default_value = "https://errorlyapi.onrender.com")]
    host: String,

    /// How much of each post to print: small, medium or large
    #[structopt(long, default_value = "large")]
    layout: Layout,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// List posts
    Posts {
        /// Only posts whose title or content contains this, ignoring case
        #[structopt(short, long, default_value = "")]
        search: String,

        /// Only posts carrying this tag, can be repeated
        #[structopt(short, long)]
        tag: Vec<String>,

        /// newest, oldest, popular or unpopular
        #[structopt(short, long, default_value = "newest")]
        order: Order,
    },

    /// List every tag in use
    Tags,

    /// Print a post and its comments
    Thread { post: PostId },

    NewPost {
        #[structopt(long)]
        title: String,
        #[structopt(long, default_value = "")]
        content: String,
        /// Comma-separated
        #[structopt(long, default_value = "")]
        tags: String,
    },

    EditPost {
        post: PostId,
        #[structopt(long)]
        title: String,
        #[structopt(long, default_value = "")]
        content: String,
        /// Comma-separated
        #[structopt(long, default_value = "")]
        tags: String,
    },

    DeletePost { post: PostId },

    /// Comment at the top level of a post
    Comment { post: PostId, content: String },

    /// Answer a comment
    Reply {
        post: PostId,
        parent: CommentId,
        content: String,
    },

    EditComment {
        post: PostId,
        comment: CommentId,
        content: String,
    },

    DeleteComment { post: PostId, comment: CommentId },

    /// Vote on a post or comment; voting the same way twice withdraws the vote
    Vote {
        /// post or comment
        kind: Kind,
        id: i64,
        /// up or down
        direction: Way,
        /// Post of the comment, required when voting on a comment
        #[structopt(long)]
        post: Option<PostId>,
    },
}

enum Kind {
    Post,
    Comment,
}

impl std::str::FromStr for Kind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Kind> {
        match s {
            "post" => Ok(Kind::Post),
            "comment" => Ok(Kind::Comment),
            _ => Err(anyhow::anyhow!("expected post or comment, got {s:?}")),
        }
    }
}

struct Way(Direction);

impl std::str::FromStr for Way {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Way> {
        match s {
            "up" => Ok(Way(Direction::Positive)),
            "down" => Ok(Way(Direction::Negative)),
            _ => Err(anyhow::anyhow!("expected up or down, got {s:?}")),
        }
    }
}

fn token() -> anyhow::Result<AuthToken> {
    let tok =
        std::env::var("ERRORLY_TOKEN").context("retrieving ERRORLY_TOKEN environment variable")?;
    anyhow::ensure!(!tok.trim().is_empty(), "ERRORLY_TOKEN is empty");
    Ok(AuthToken(tok.trim().to_string()))
}

fn print_post(p: &Post, layout: Layout) {
    println!("#{} {} ({:+})", p.id, p.title, p.score);
    if layout == Layout::Small {
        return;
    }
    if !p.tags.is_empty() {
        println!("    tags: {}", p.tags.join(", "));
    }
    println!("    posted {}, updated {}", p.created_at, p.last_updated);
    if layout == Layout::Large && !p.content.is_empty() {
        for line in p.content.lines() {
            println!("    | {line}");
        }
    }
}

fn print_thread(s: &Session<HttpGateway>) {
    for n in walk(&s.thread()) {
        let indent = "  ".repeat(n.depth + 1);
        println!(
            "{indent}[{}] ({:+}) {}",
            n.comment.id, n.comment.score, n.comment.content
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let gateway = HttpGateway::new(opt.host.clone(), token()?);
    let mut s = Session::new(gateway);
    s.view_mut().set_layout(opt.layout);
    s.load()
        .await
        .with_context(|| format!("loading posts from {}", opt.host))?;

    match opt.cmd {
        Command::Posts { search, tag, order } => {
            let v = s.view_mut();
            v.set_search(search);
            v.set_order(order);
            for t in &tag {
                v.toggle_tag(t);
            }
            for p in s.visible_posts() {
                print_post(&p, s.view().layout);
            }
        }
        Command::Tags => {
            for t in &s.view().all_tags {
                println!("{t}");
            }
        }
        Command::Thread { post } => {
            s.open_post(post).await.context("opening post")?;
            if let Some(p) = s.store().post(post) {
                print_post(p, s.view().layout);
            }
            print_thread(&s);
        }
        Command::NewPost {
            title,
            content,
            tags,
        } => {
            let id = s
                .create_post(&title, &content, parse_tags(&tags))
                .await
                .context("creating post")?;
            println!("created post #{id}");
        }
        Command::EditPost {
            post,
            title,
            content,
            tags,
        } => {
            s.edit_post(post, &title, &content, parse_tags(&tags))
                .await
                .context("editing post")?;
            println!("edited post #{post}");
        }
        Command::DeletePost { post } => {
            s.delete_post(post).await.context("deleting post")?;
            println!("deleted post #{post}");
        }
        Command::Comment { post, content } => {
            s.open_post(post).await.context("opening post")?;
            let id = s
                .create_comment(&content)
                .await
                .context("creating comment")?;
            println!("created comment #{id}");
        }
        Command::Reply {
            post,
            parent,
            content,
        } => {
            s.open_post(post).await.context("opening post")?;
            let id = s.reply(parent, &content).await.context("replying")?;
            println!("created comment #{id}");
        }
        Command::EditComment {
            post,
            comment,
            content,
        } => {
            s.open_post(post).await.context("opening post")?;
            s.edit_comment(comment, &content)
                .await
                .context("editing comment")?;
            println!("edited comment #{comment}");
        }
        Command::DeleteComment { post, comment } => {
            s.open_post(post).await.context("opening post")?;
            s.delete_comment(comment)
                .await
                .context("deleting comment")?;
            println!("deleted comment #{comment}");
        }
        Command::Vote {
            kind,
            id,
            direction: Way(direction),
            post,
        } => {
            let target = match kind {
                Kind::Post => Target::Post(PostId(id)),
                Kind::Comment => {
                    let post = post.context("--post is required to vote on a comment")?;
                    s.open_post(post).await.context("opening post")?;
                    Target::Comment(CommentId(id))
                }
            };
            let out = s.cast_vote(target, direction).await.context("voting")?;
            println!("{} vote on {target}, score is now {}", out.op, out.score);
        }
    }

    Ok(())
}
