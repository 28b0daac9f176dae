//! Command-line surface for `coursehub-cli`.

#![deny(clippy::all, clippy::pedantic)]

use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use coursehub::domain::types::{CourseLevel, UserRole};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "coursehub-cli",
    version,
    about = "Coursehub command-line client",
    long_about = None
)]
pub struct Cli {
    /// API base URL, e.g. <http://127.0.0.1:5000>
    #[arg(long, env = "COURSEHUB_SITE_URL")]
    pub site: Option<String>,

    /// File holding the session cookie between invocations
    #[arg(long, env = "COURSEHUB_SESSION_FILE", default_value = ".coursehub-session")]
    pub session_file: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// One line typed at the `shell` prompt.
#[derive(Parser, Debug)]
#[command(name = "coursehub", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account and sign in
    Register(RegisterArgs),
    /// Sign in with a username or email
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "COURSEHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Course catalog, enrollment and authoring
    Courses(CoursesArgs),
    /// Blog posts and comments
    Blog(BlogArgs),
    /// Role dashboards and admin actions
    Dashboard(DashboardArgs),
    /// Read commands from stdin, sharing one query cache
    Shell,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "COURSEHUB_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    /// Sign up as an instructor instead of a student
    #[arg(long, default_value_t = false)]
    pub instructor: bool,
}

#[derive(Parser, Debug)]
pub struct CoursesArgs {
    #[command(subcommand)]
    pub action: CoursesCmd,
}

#[derive(Subcommand, Debug)]
pub enum CoursesCmd {
    /// Browse the catalog
    List {
        #[arg(long)]
        category_id: Option<Uuid>,
        #[arg(long)]
        instructor_id: Option<Uuid>,
        #[arg(long)]
        level: Option<LevelArg>,
        #[arg(long)]
        search: Option<String>,
        /// Include unpublished courses
        #[arg(long, default_value_t = false)]
        all: bool,
        #[arg(long)]
        featured: Option<bool>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show a course with lessons and reviews
    Show {
        /// Course id
        #[arg(long, conflicts_with = "slug", required_unless_present = "slug")]
        id: Option<Uuid>,
        #[arg(long)]
        slug: Option<String>,
    },
    /// List the active categories
    Categories,
    /// Enroll in a course
    Enroll { id: Uuid },
    /// Add a course to the wishlist
    Wishlist { id: Uuid },
    /// Remove a course from the wishlist
    Unwishlist { id: Uuid },
    /// Review a course you are enrolled in
    Review {
        id: Uuid,
        #[arg(long)]
        rating: i32,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Mark a lesson complete for one of your enrollments
    Complete {
        #[arg(long)]
        enrollment: Uuid,
        #[arg(long)]
        lesson: Uuid,
    },
    /// Create a draft course (instructors)
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Price in dollars, e.g. 49.99
        #[arg(long)]
        price: String,
        #[arg(long, default_value_t = LevelArg::Beginner)]
        level: LevelArg,
        #[arg(long)]
        category_id: Uuid,
    },
    /// Submit a draft course for review (instructors)
    Submit { id: Uuid },
    /// Append a lesson to a course (instructors)
    AddLesson {
        id: Uuid,
        #[arg(long)]
        title: String,
        #[arg(long)]
        video_url: Option<String>,
        /// Length in seconds
        #[arg(long)]
        duration: Option<i32>,
        #[arg(long, default_value_t = false)]
        free: bool,
    },
    /// Delete a course
    Delete { id: Uuid },
}

#[derive(Parser, Debug)]
pub struct BlogArgs {
    #[command(subcommand)]
    pub action: BlogCmd,
}

#[derive(Subcommand, Debug)]
pub enum BlogCmd {
    /// List published posts
    List {
        #[arg(long)]
        category_id: Option<Uuid>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Read a post with its comments
    Show { id: Uuid },
    /// Comment on a post
    Comment {
        id: Uuid,
        #[arg(long)]
        content: String,
        #[arg(long)]
        parent: Option<Uuid>,
    },
}

#[derive(Parser, Debug)]
pub struct DashboardArgs {
    #[command(subcommand)]
    pub action: DashboardCmd,
}

#[derive(Subcommand, Debug)]
pub enum DashboardCmd {
    /// Enrollments, progress and wishlist
    Student,
    /// Your own courses and their status
    Instructor,
    /// Platform stats, users and pending courses
    Admin,
    /// Approve a pending course
    Approve { id: Uuid },
    /// Reject a pending course
    Reject { id: Uuid },
    /// Change a user's role or activation
    SetUser {
        id: Uuid,
        #[arg(long)]
        role: Option<RoleArg>,
        #[arg(long)]
        active: Option<bool>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LevelArg {
    Beginner,
    Intermediate,
    Advanced,
}

impl LevelArg {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl From<LevelArg> for CourseLevel {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Beginner => CourseLevel::Beginner,
            LevelArg::Intermediate => CourseLevel::Intermediate,
            LevelArg::Advanced => CourseLevel::Advanced,
        }
    }
}

impl fmt::Display for LevelArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Student,
    Instructor,
    Admin,
}

impl From<RoleArg> for UserRole {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Student => UserRole::Student,
            RoleArg::Instructor => UserRole::Instructor,
            RoleArg::Admin => UserRole::Admin,
        }
    }
}
