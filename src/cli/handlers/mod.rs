mod init;
pub use init::cmd_init;

use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use serde_json::json;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::file_store::FileStore;
use crate::io::store::{Select, Store, Table, row, row_id};
use crate::io::workspace_io::{self, Workspace};
use crate::model::{
    Day, Project, ProjectCatalog, Task, Team, TeamMember, ThemePreference, TimeBlock, UNASSIGNED,
};
use crate::ops::notice::Notices;
use crate::ops::people::{PeopleHook, new_member_row};
use crate::ops::profile::ProfileHook;
use crate::ops::query::QueryOptions;
use crate::ops::tasks::{MoveTask, NewTask, TaskHook, TaskPatch};
use crate::ops::team_state::TeamStateHook;

type CmdResult = Result<(), Box<dyn Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let Some(cmd) = cli.command else {
        return Err("no command given (run `rota` without arguments for the board)".into());
    };

    let mut session = match cmd {
        // Init is handled in main.rs before workspace discovery
        Commands::Init(args) => return cmd_init(args, cli.dir.as_deref()),
        Commands::Login(args) => return cmd_login(cli.dir.as_deref(), &args.id),
        _ => Session::open(cli.dir.as_deref(), cli.as_user)?,
    };
    match cmd {
        Commands::Init(_) | Commands::Login(_) => Ok(()),

        // Read commands
        Commands::Teams => cmd_teams(&session, json),
        Commands::Members(args) => cmd_members(&session, args, json),
        Commands::Tasks(args) => cmd_tasks(&session, args, json),
        Commands::Projects(args) => cmd_projects(&session, args, json),

        // Task writes
        Commands::Assign(args) => cmd_assign(&mut session, args, json),
        Commands::Edit(args) => cmd_edit(&mut session, args, json),
        Commands::Move(args) => cmd_move(&mut session, args, json),
        Commands::Delete(args) => cmd_delete(&mut session, args, json),

        // Member writes
        Commands::Admin(args) => cmd_admin(&mut session, args, json),
        Commands::Deactivate(args) => cmd_deactivate(&mut session, args, json),
        Commands::Reactivate(args) => cmd_reactivate(&mut session, args, json),
        Commands::Reassign(args) => cmd_reassign(&mut session, args, json),
        Commands::Theme(args) => cmd_theme(&mut session, args, json),

        // Seeding
        Commands::Team(TeamCmd {
            action: TeamAction::Add { name },
        }) => cmd_team_add(&session, &name, json),
        Commands::Member(MemberCmd {
            action: MemberAction::Add(args),
        }) => cmd_member_add(&session, args, json),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One CLI invocation against a workspace: the store plus what the hooks need
struct Session {
    store: FileStore,
    catalog: ProjectCatalog,
    options: QueryOptions,
    notices: Notices,
}

impl Session {
    fn open(dir: Option<&str>, as_user: Option<String>) -> Result<Self, Box<dyn Error>> {
        let workspace = load_workspace_from(dir)?;
        let user = as_user.or_else(|| workspace.config.session.user.clone());
        let store = FileStore::open(&workspace.rota_dir, user)?;
        let catalog = ProjectCatalog::from_config(&workspace.config.projects);
        let options = QueryOptions::from(&workspace.config.cache);
        Ok(Session {
            store,
            catalog,
            options,
            notices: Notices::new(),
        })
    }

    fn team_state(&self) -> Result<TeamStateHook, Box<dyn Error>> {
        let mut hook = TeamStateHook::new(&self.store, self.options);
        hook.refresh(&self.store, Instant::now());
        if let Some(e) = hook.teams_query().error() {
            return Err(e.to_string().into());
        }
        if let Some(e) = hook.members_query().error() {
            return Err(e.to_string().into());
        }
        Ok(hook)
    }

    fn people(&self, teams: &[Team]) -> Result<PeopleHook, Box<dyn Error>> {
        let mut hook = PeopleHook::new(&self.store, self.options);
        hook.refresh(&self.store, teams, Instant::now());
        if let Some(e) = hook.query().error() {
            return Err(e.to_string().into());
        }
        Ok(hook)
    }

    fn tasks(&self) -> Result<TaskHook, Box<dyn Error>> {
        let mut hook = TaskHook::new(&self.store, self.options);
        hook.refresh(&self.store, &self.catalog, Instant::now());
        if let Some(e) = hook.query().error() {
            return Err(e.to_string().into());
        }
        Ok(hook)
    }

    /// Report a hook write: the success notice on stdout, or the error
    /// notice as the command's error
    fn finish(&self, ok: bool, id: Option<String>, json: bool) -> CmdResult {
        let message = self
            .notices
            .all()
            .last()
            .map(|n| n.text.clone())
            .unwrap_or_default();
        if !ok {
            return Err(message.into());
        }
        if json {
            let out = WriteJson { ok, message, id };
            println!("{}", serde_json::to_string_pretty(&out)?);
        } else {
            match id {
                Some(id) => println!("{} ({})", message, id),
                None => println!("{}", message),
            }
        }
        Ok(())
    }
}

fn load_workspace_from(dir: Option<&str>) -> Result<Workspace, Box<dyn Error>> {
    let start: PathBuf = match dir {
        Some(d) => std::fs::canonicalize(d)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", d, e))?,
        None => std::env::current_dir()?,
    };
    let root = workspace_io::discover_workspace(&start)?;
    Ok(workspace_io::load_workspace(&root)?)
}

// ---------------------------------------------------------------------------
// Resolvers
// ---------------------------------------------------------------------------

/// Member by exact id, else case-insensitive full name, else a unique
/// case-insensitive name substring
fn resolve_member<'a>(members: &'a [TeamMember], query: &str) -> Result<&'a TeamMember, String> {
    if let Some(m) = members.iter().find(|m| m.id == query) {
        return Ok(m);
    }
    let needle = query.trim().to_lowercase();
    if let Some(m) = members.iter().find(|m| m.name.to_lowercase() == needle) {
        return Ok(m);
    }
    let matches: Vec<&TeamMember> = members
        .iter()
        .filter(|m| m.name.to_lowercase().contains(&needle))
        .collect();
    match matches.as_slice() {
        [one] => Ok(*one),
        [] => Err(format!("no member matches \"{}\"", query)),
        many => Err(format!(
            "\"{}\" is ambiguous: {}",
            query,
            many.iter().map(|m| m.name.as_str()).collect::<Vec<_>>().join(", ")
        )),
    }
}

/// Task by exact id, else a unique id prefix
fn resolve_task<'a>(tasks: &'a [Task], query: &str) -> Result<&'a Task, String> {
    if let Some(t) = tasks.iter().find(|t| t.id == query) {
        return Ok(t);
    }
    let matches: Vec<&Task> = tasks.iter().filter(|t| t.id.starts_with(query)).collect();
    match matches.as_slice() {
        [one] => Ok(*one),
        [] => Err(format!("task not found: {}", query)),
        _ => Err(format!("task id prefix \"{}\" matches {} tasks", query, matches.len())),
    }
}

/// Project by exact name, else a unique filter match
fn resolve_project<'a>(catalog: &'a ProjectCatalog, query: &str) -> Result<&'a Project, String> {
    if let Some(p) = catalog.lookup_by_title(query) {
        return Ok(p);
    }
    let matches = catalog.filter(query);
    match matches.as_slice() {
        [one] => Ok(*one),
        [] => Err(format!("no project matches \"{}\"", query)),
        many => Err(format!(
            "\"{}\" is ambiguous: {}",
            query,
            many.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ")
        )),
    }
}

/// Team by case-insensitive name
fn resolve_team<'a>(teams: &'a [Team], query: &str) -> Result<&'a Team, String> {
    teams
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(query.trim()))
        .ok_or_else(|| format!("no team named \"{}\"", query))
}

fn parse_day(s: &str) -> Result<Day, String> {
    s.parse()
}

fn parse_block(s: Option<&str>) -> Result<TimeBlock, String> {
    s.map(str::parse).unwrap_or(Ok(TimeBlock::WholeDay))
}

// ---------------------------------------------------------------------------
// Workspace commands
// ---------------------------------------------------------------------------

fn cmd_login(dir: Option<&str>, id: &str) -> CmdResult {
    let workspace = load_workspace_from(dir)?;
    let mut doc = workspace_io::read_config_doc(&workspace.rota_dir)?;
    workspace_io::set_session_user(&mut doc, id);
    workspace_io::write_config_doc(&workspace.rota_dir, &doc)?;

    let store = FileStore::open(&workspace.rota_dir, Some(id.to_string()))?;
    let found = store.select(Table::Profiles, &Select::all().eq("id", id).limit(1))?;
    if found.is_empty() {
        tracing::warn!(user = id, "login without a matching profile");
        eprintln!("Note: no profile with id {} yet", id);
    }
    println!("Signed in as {}", id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_teams(session: &Session, json: bool) -> CmdResult {
    let state = session.team_state()?;
    if json {
        let out: Vec<TeamJson> = state
            .teams()
            .iter()
            .map(|t| team_to_json(t, state.members_of(&t.name).len()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if state.teams().is_empty() {
        println!("No teams yet. Add one with: rota team add <name>");
    } else {
        for team in state.teams() {
            println!("{}", format_team_line(team, state.members_of(&team.name).len()));
        }
    }
    Ok(())
}

fn cmd_members(session: &Session, args: MembersArgs, json: bool) -> CmdResult {
    let state = session.team_state()?;
    let people = session.people(state.teams())?;
    let team = match args.team.as_deref() {
        Some(name) if name.eq_ignore_ascii_case(UNASSIGNED) => Some(None),
        Some(name) => Some(Some(resolve_team(state.teams(), name)?.name.clone())),
        None => None,
    };
    let members: Vec<&TeamMember> = people
        .members()
        .iter()
        .filter(|m| args.all || m.is_active())
        .filter(|m| team.as_ref().is_none_or(|t| m.team == *t))
        .collect();

    if json {
        let out: Vec<MemberJson> = members.iter().map(|m| member_to_json(m)).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for member in members {
            println!("{}", format_member_line(member));
        }
    }
    Ok(())
}

fn cmd_tasks(session: &Session, args: TasksArgs, json: bool) -> CmdResult {
    let state = session.team_state()?;
    let hook = session.tasks()?;
    let day = args.day.as_deref().map(parse_day).transpose()?;
    let team = args
        .team
        .as_deref()
        .map(|t| resolve_team(state.teams(), t).map(|t| t.name.clone()))
        .transpose()?;
    let member_id = match args.member.as_deref() {
        Some(q) => {
            let people = session.people(state.teams())?;
            Some(resolve_member(people.members(), q)?.id.clone())
        }
        None => None,
    };

    let team_rank = |name: &str| {
        state
            .teams()
            .iter()
            .position(|t| t.name == name)
            .unwrap_or(usize::MAX)
    };
    let mut tasks: Vec<&Task> = hook
        .tasks()
        .iter()
        .filter(|t| day.is_none_or(|d| t.day == d))
        .filter(|t| team.as_deref().is_none_or(|name| t.team == name))
        .filter(|t| {
            member_id
                .as_deref()
                .is_none_or(|id| t.assignee_id.as_deref() == Some(id))
        })
        .collect();
    tasks.sort_by_key(|t| (t.day, team_rank(&t.team), t.time_block));

    if json {
        let out: Vec<TaskJson> = tasks.iter().map(|t| task_to_json(t)).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for task in tasks {
            println!("{}", format_task_line(task));
        }
    }
    Ok(())
}

fn cmd_projects(session: &Session, args: ProjectsArgs, json: bool) -> CmdResult {
    let projects = session.catalog.filter(args.filter.as_deref().unwrap_or(""));
    if json {
        let out: Vec<ProjectJson> = projects.iter().map(|p| project_to_json(p)).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if projects.is_empty() {
        println!("No projects match");
    } else {
        for project in projects {
            println!("{}", format_project_line(project));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Task writes
// ---------------------------------------------------------------------------

fn cmd_assign(session: &mut Session, args: AssignArgs, json: bool) -> CmdResult {
    let state = session.team_state()?;
    let people = session.people(state.teams())?;
    let member = resolve_member(people.members(), &args.member)?;
    if !member.is_active() {
        return Err(format!("{} is deactivated", member.name).into());
    }
    let Some(team) = member.team.clone() else {
        return Err(format!(
            "{} has no team; run `rota reassign \"{}\" <team>` first",
            member.name, member.name
        )
        .into());
    };
    let new = NewTask {
        project: resolve_project(&session.catalog, &args.project)?.name.clone(),
        time_block: parse_block(args.block.as_deref())?,
        description: args.description,
        day: parse_day(&args.day)?,
        team,
        assignee_id: Some(member.id.clone()),
        assignee: member.name.clone(),
    };

    let mut hook = session.tasks()?;
    let id = hook.create(&session.store, &session.catalog, &mut session.notices, new);
    session.finish(id.is_some(), id, json)
}

fn cmd_edit(session: &mut Session, args: EditArgs, json: bool) -> CmdResult {
    let mut hook = session.tasks()?;
    let id = resolve_task(hook.tasks(), &args.task)?.id.clone();
    let patch = TaskPatch {
        project: args
            .project
            .as_deref()
            .map(|p| resolve_project(&session.catalog, p).map(|p| p.name.clone()))
            .transpose()?,
        time_block: args.block.as_deref().map(str::parse).transpose()?,
        description: args.description,
        ..Default::default()
    };
    if patch == TaskPatch::default() {
        return Err("nothing to change (use --project, --block or --description)".into());
    }
    let ok = hook.update(&session.store, &session.catalog, &mut session.notices, &id, patch);
    session.finish(ok, None, json)
}

fn cmd_move(session: &mut Session, args: MoveArgs, json: bool) -> CmdResult {
    let state = session.team_state()?;
    let mut hook = session.tasks()?;
    let mv = MoveTask {
        task_id: resolve_task(hook.tasks(), &args.task)?.id.clone(),
        day: parse_day(&args.day)?,
        team: resolve_team(state.teams(), &args.team)?.name.clone(),
    };
    let ok = hook.move_task(&session.store, &mut session.notices, &mv);
    session.finish(ok, None, json)
}

fn cmd_delete(session: &mut Session, args: DeleteArgs, json: bool) -> CmdResult {
    let mut hook = session.tasks()?;
    let id = resolve_task(hook.tasks(), &args.task)?.id.clone();
    let ok = hook.delete(&session.store, &mut session.notices, &id);
    session.finish(ok, None, json)
}

// ---------------------------------------------------------------------------
// Member writes
// ---------------------------------------------------------------------------

fn cmd_admin(session: &mut Session, args: MemberRef, json: bool) -> CmdResult {
    let state = session.team_state()?;
    let mut people = session.people(state.teams())?;
    let (id, current) = {
        let m = resolve_member(people.members(), &args.member)?;
        (m.id.clone(), m.is_admin)
    };
    let ok = people.toggle_admin(&session.store, &mut session.notices, &id, current);
    session.finish(ok, None, json)
}

fn cmd_deactivate(session: &mut Session, args: MemberRef, json: bool) -> CmdResult {
    let state = session.team_state()?;
    let mut people = session.people(state.teams())?;
    let id = {
        let m = resolve_member(people.members(), &args.member)?;
        if !m.is_active() {
            return Err(format!("{} is already deactivated", m.name).into());
        }
        m.id.clone()
    };
    let ok = people.deactivate(&session.store, &mut session.notices, &id);
    session.finish(ok, None, json)
}

fn cmd_reactivate(session: &mut Session, args: MemberRef, json: bool) -> CmdResult {
    let state = session.team_state()?;
    let mut people = session.people(state.teams())?;
    let (id, team_id) = {
        let m = resolve_member(people.members(), &args.member)?;
        if m.is_active() {
            return Err(format!("{} is already active", m.name).into());
        }
        (m.id.clone(), m.team_id.clone())
    };
    let ok = people.reactivate(&session.store, &mut session.notices, &id, team_id);
    session.finish(ok, None, json)
}

fn cmd_reassign(session: &mut Session, args: ReassignArgs, json: bool) -> CmdResult {
    let state = session.team_state()?;
    let mut people = session.people(state.teams())?;
    let id = resolve_member(people.members(), &args.member)?.id.clone();
    let team = if args.team.eq_ignore_ascii_case(UNASSIGNED) {
        UNASSIGNED.to_string()
    } else {
        resolve_team(state.teams(), &args.team)?.name.clone()
    };
    let ok = people.reassign_team(&session.store, &mut session.notices, &id, &team);
    session.finish(ok, None, json)
}

fn cmd_theme(session: &mut Session, args: ThemeArgs, json: bool) -> CmdResult {
    if session.store.current_user().is_none() {
        return Err("no session user; run `rota login <id>` or pass --as <id>".into());
    }
    let state = session.team_state()?;
    let mut profile = ProfileHook::new(&session.store, session.options);
    profile.refresh(&session.store, state.teams(), Instant::now());
    if let Some(e) = profile.query().and_then(|q| q.error()) {
        return Err(e.to_string().into());
    }
    let ok = match args.preference.as_deref() {
        Some(pref) => {
            let theme: ThemePreference = pref.parse()?;
            profile.set_theme(&session.store, &mut session.notices, theme)
        }
        None => profile.cycle_theme(&session.store, &mut session.notices),
    };
    session.finish(ok, None, json)
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

fn cmd_team_add(session: &Session, name: &str, json: bool) -> CmdResult {
    let name = name.trim();
    if name.is_empty() {
        return Err("team name cannot be empty".into());
    }
    if name.eq_ignore_ascii_case(UNASSIGNED) {
        return Err(format!("\"{}\" is reserved", UNASSIGNED).into());
    }
    let state = session.team_state()?;
    if resolve_team(state.teams(), name).is_ok() {
        return Err(format!("team \"{}\" already exists", name).into());
    }
    let order_index = state
        .teams()
        .iter()
        .map(|t| t.order_index + 1)
        .max()
        .unwrap_or(0);
    let stored = session.store.insert(
        Table::Teams,
        row([("name", json!(name)), ("order_index", json!(order_index))]),
    )?;
    let id = row_id(&stored).map(String::from);
    tracing::info!(team = name, id = ?id, "team added");

    let mut notices = Notices::new();
    notices.info("Success", format!("Team added: {}", name));
    report_insert(&notices, id, json)
}

fn cmd_member_add(session: &Session, args: MemberAddArgs, json: bool) -> CmdResult {
    let name = args.name.trim();
    if name.is_empty() {
        return Err("member name cannot be empty".into());
    }
    let state = session.team_state()?;
    let team_id = args
        .team
        .as_deref()
        .map(|t| resolve_team(state.teams(), t).map(|t| t.id.clone()))
        .transpose()?;

    let mut new_row = new_member_row(
        name,
        args.email.as_deref(),
        args.role.as_deref(),
        team_id.as_deref(),
    );
    if let Some(id) = args.id.as_deref() {
        let existing = session
            .store
            .select(Table::Profiles, &Select::all().eq("id", id).limit(1))?;
        if !existing.is_empty() {
            return Err(format!("a profile with id {} already exists", id).into());
        }
        new_row.insert("id".into(), json!(id));
    }
    let stored = session.store.insert(Table::Profiles, new_row)?;
    let id = row_id(&stored).map(String::from);
    tracing::info!(member = name, id = ?id, "member added");

    let mut notices = Notices::new();
    notices.info("Success", format!("Member added: {}", name));
    report_insert(&notices, id, json)
}

fn report_insert(notices: &Notices, id: Option<String>, json: bool) -> CmdResult {
    let message = notices
        .all()
        .last()
        .map(|n| n.text.clone())
        .unwrap_or_default();
    if json {
        let out = WriteJson {
            ok: true,
            message,
            id,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        match id {
            Some(id) => println!("{} ({})", message, id),
            None => println!("{}", message),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MemberStatus;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn member(id: &str, name: &str) -> TeamMember {
        TeamMember {
            id: id.into(),
            name: name.into(),
            title: "Team Member".into(),
            avatar: String::new(),
            email: None,
            team: Some("Design".into()),
            team_id: Some("t-design".into()),
            role: None,
            is_admin: false,
            status: MemberStatus::Active,
            order_index: 0,
        }
    }

    fn task(id: &str) -> Task {
        Task {
            id: id.into(),
            title: "Client Support".into(),
            description: None,
            assignee_id: None,
            assignee: "Sarah Chen".into(),
            day: Day::Mon,
            time_block: TimeBlock::WholeDay,
            team: "Design".into(),
            color: "#FF2D55".into(),
        }
    }

    #[test]
    fn member_resolution_order() {
        let members = vec![
            member("u-sarah", "Sarah Chen"),
            member("u-sara", "Sara Lee"),
            member("u-mike", "Mike Ross"),
        ];
        assert_eq!(resolve_member(&members, "u-mike").unwrap().name, "Mike Ross");
        assert_eq!(resolve_member(&members, "sarah chen").unwrap().id, "u-sarah");
        assert_eq!(resolve_member(&members, "ross").unwrap().id, "u-mike");
        let err = resolve_member(&members, "sara").unwrap_err();
        assert!(err.contains("ambiguous"));
        assert!(resolve_member(&members, "nobody").is_err());
    }

    #[test]
    fn task_resolution_by_prefix() {
        let tasks = vec![task("a1b2c3"), task("a1ff00"), task("b7")];
        assert_eq!(resolve_task(&tasks, "b7").unwrap().id, "b7");
        assert_eq!(resolve_task(&tasks, "a1b").unwrap().id, "a1b2c3");
        assert!(resolve_task(&tasks, "a1").unwrap_err().contains("matches 2"));
        assert!(resolve_task(&tasks, "zz").is_err());
    }

    #[test]
    fn project_resolution() {
        let catalog = ProjectCatalog::default();
        assert_eq!(resolve_project(&catalog, "market").unwrap().name, "Marketing Strategy");
        assert_eq!(resolve_project(&catalog, "User Testing").unwrap().id, "8");
        // "client" matches two catalog entries
        assert!(resolve_project(&catalog, "client").is_err());
    }

    #[test]
    fn team_resolution_ignores_case() {
        let teams = vec![Team {
            id: "t-eng".into(),
            name: "Engineering".into(),
            order_index: 0,
        }];
        assert_eq!(resolve_team(&teams, "engineering").unwrap().id, "t-eng");
        assert!(resolve_team(&teams, "Design").is_err());
    }

    #[test]
    fn block_defaults_to_whole_day() {
        assert_eq!(parse_block(None).unwrap(), TimeBlock::WholeDay);
        assert_eq!(parse_block(Some("am")).unwrap(), TimeBlock::Morning);
        assert!(parse_block(Some("evening")).is_err());
    }

    fn run(dir: &str, args: &[&str]) -> CmdResult {
        let mut argv = vec!["rota", "-C", dir];
        argv.extend_from_slice(args);
        dispatch(Cli::parse_from(argv))
    }

    fn workspace() -> (TempDir, String) {
        let tmp = TempDir::new().unwrap();
        workspace_io::init_workspace(tmp.path(), "Studio", Some("u-sarah")).unwrap();
        let dir = tmp.path().to_str().unwrap().to_string();
        (tmp, dir)
    }

    fn stored_tasks(dir: &str) -> Vec<Task> {
        let session = Session::open(Some(dir), None).unwrap();
        session.tasks().unwrap().tasks().to_vec()
    }

    #[test]
    fn assign_then_move_then_delete() {
        let (_tmp, dir) = workspace();
        run(&dir, &["team", "add", "Design"]).unwrap();
        run(&dir, &["team", "add", "Engineering"]).unwrap();
        run(&dir, &["member", "add", "Sarah Chen", "--team", "design", "--id", "u-sarah"]).unwrap();
        run(&dir, &["assign", "sarah", "tue", "market", "--block", "am"]).unwrap();

        let tasks = stored_tasks(&dir);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Marketing Strategy");
        assert_eq!(tasks[0].team, "Design");
        assert_eq!(tasks[0].day, Day::Tue);
        assert_eq!(tasks[0].time_block, TimeBlock::Morning);
        assert_eq!(tasks[0].assignee_id.as_deref(), Some("u-sarah"));

        let id = tasks[0].id.clone();
        run(&dir, &["move", &id[..6], "thu", "engineering"]).unwrap();
        let moved = stored_tasks(&dir);
        assert_eq!(moved[0].day, Day::Thu);
        assert_eq!(moved[0].team, "Engineering");

        run(&dir, &["delete", &id]).unwrap();
        assert!(stored_tasks(&dir).is_empty());
    }

    #[test]
    fn assign_requires_a_team() {
        let (_tmp, dir) = workspace();
        run(&dir, &["member", "add", "Mike Ross"]).unwrap();
        let err = run(&dir, &["assign", "mike", "mon", "Client Support"]).unwrap_err();
        assert!(err.to_string().contains("has no team"));
    }

    #[test]
    fn deactivate_then_reactivate() {
        let (_tmp, dir) = workspace();
        run(&dir, &["team", "add", "Design"]).unwrap();
        run(&dir, &["member", "add", "Mike Ross", "--team", "Design", "--id", "u-mike"]).unwrap();
        run(&dir, &["deactivate", "u-mike"]).unwrap();
        assert!(run(&dir, &["deactivate", "u-mike"]).is_err());
        run(&dir, &["reactivate", "Mike Ross"]).unwrap();

        let session = Session::open(Some(&dir), None).unwrap();
        let state = session.team_state().unwrap();
        let people = session.people(state.teams()).unwrap();
        let mike = people.find("u-mike").unwrap();
        assert!(mike.is_active());
        assert_eq!(mike.team.as_deref(), Some("Design"));
    }

    #[test]
    fn theme_needs_a_profile_row() {
        let (_tmp, dir) = workspace();
        // session user is set but no profile row exists yet
        assert!(run(&dir, &["theme", "dark"]).is_err());
        run(&dir, &["member", "add", "Sarah Chen", "--id", "u-sarah"]).unwrap();
        run(&dir, &["theme", "dark"]).unwrap();
        run(&dir, &["theme"]).unwrap();

        let session = Session::open(Some(&dir), None).unwrap();
        let mut profile = ProfileHook::new(&session.store, session.options);
        let theme = profile
            .refresh(&session.store, &[], Instant::now())
            .map(|p| p.theme_preference);
        assert_eq!(theme, Some(ThemePreference::System));
    }

    #[test]
    fn duplicate_team_rejected() {
        let (_tmp, dir) = workspace();
        run(&dir, &["team", "add", "Design"]).unwrap();
        assert!(run(&dir, &["team", "add", "design"]).is_err());
        assert!(run(&dir, &["team", "add", "Unassigned"]).is_err());
    }
}
