use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rota", about = concat!("rota v", env!("CARGO_PKG_VERSION"), " - who is on what, this week"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,

    /// Act as this profile id instead of the configured session user
    #[arg(long = "as", global = true, value_name = "ID")]
    pub as_user: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a rota workspace in the current directory
    Init(InitArgs),
    /// Set the session user in rota.toml
    Login(LoginArgs),
    /// List teams
    Teams,
    /// List members
    Members(MembersArgs),
    /// List task assignments
    Tasks(TasksArgs),
    /// List or filter the project catalog
    Projects(ProjectsArgs),
    /// Assign a member to a project for a day
    Assign(AssignArgs),
    /// Edit a task assignment
    Edit(EditArgs),
    /// Move a task to another day and team
    Move(MoveArgs),
    /// Delete a task assignment
    Delete(DeleteArgs),
    /// Grant or revoke admin rights
    Admin(MemberRef),
    /// Deactivate a member
    Deactivate(MemberRef),
    /// Reactivate a deactivated member
    Reactivate(MemberRef),
    /// Move a member to another team, or to Unassigned
    Reassign(ReassignArgs),
    /// Show, set or cycle the theme preference
    Theme(ThemeArgs),
    /// Team management
    Team(TeamCmd),
    /// Member management
    Member(MemberCmd),
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Board name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Profile id to sign in as
    #[arg(long)]
    pub user: Option<String>,
}

#[derive(Args)]
pub struct LoginArgs {
    /// Profile id
    pub id: String,
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct MembersArgs {
    /// Include deactivated members
    #[arg(long)]
    pub all: bool,
    /// Only members of this team
    #[arg(long)]
    pub team: Option<String>,
}

#[derive(Args)]
pub struct TasksArgs {
    /// Only tasks owned by this team
    #[arg(long)]
    pub team: Option<String>,
    /// Only tasks on this day (Mon..Fri)
    #[arg(long)]
    pub day: Option<String>,
    /// Only tasks assigned to this member (id or name)
    #[arg(long)]
    pub member: Option<String>,
}

#[derive(Args)]
pub struct ProjectsArgs {
    /// Case-insensitive substring filter
    pub filter: Option<String>,
}

// ---------------------------------------------------------------------------
// Task writes
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AssignArgs {
    /// Member id or name
    pub member: String,
    /// Day (Mon..Fri)
    pub day: String,
    /// Project name (unique substring is enough)
    pub project: String,
    /// whole-day, morning or afternoon
    #[arg(long)]
    pub block: Option<String>,
    /// Free-text note shown under the title
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task id (a unique prefix is enough)
    pub task: String,
    /// New project
    #[arg(long)]
    pub project: Option<String>,
    /// whole-day, morning or afternoon
    #[arg(long)]
    pub block: Option<String>,
    /// New description; an empty string clears it
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct MoveArgs {
    /// Task id (a unique prefix is enough)
    pub task: String,
    /// Target day (Mon..Fri)
    pub day: String,
    /// Target team name
    pub team: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Task id (a unique prefix is enough)
    pub task: String,
}

// ---------------------------------------------------------------------------
// Member writes
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct MemberRef {
    /// Member id or name
    pub member: String,
}

#[derive(Args)]
pub struct ReassignArgs {
    /// Member id or name
    pub member: String,
    /// Team name, or "Unassigned"
    pub team: String,
}

#[derive(Args)]
pub struct ThemeArgs {
    /// light, dark or system; omitted cycles light -> dark -> system
    pub preference: Option<String>,
}

#[derive(Args)]
pub struct TeamCmd {
    #[command(subcommand)]
    pub action: TeamAction,
}

#[derive(Subcommand)]
pub enum TeamAction {
    /// Add a team at the end of the board
    Add {
        /// Team name
        name: String,
    },
}

#[derive(Args)]
pub struct MemberCmd {
    #[command(subcommand)]
    pub action: MemberAction,
}

#[derive(Subcommand)]
pub enum MemberAction {
    /// Add a member profile
    Add(MemberAddArgs),
}

#[derive(Args)]
pub struct MemberAddArgs {
    /// Full name
    pub name: String,
    /// Team name
    #[arg(long)]
    pub team: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// Role label shown under the name
    #[arg(long)]
    pub role: Option<String>,
    /// Profile id (default: generated)
    #[arg(long)]
    pub id: Option<String>,
}
