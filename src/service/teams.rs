use crate::access::require;
use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::store::Session;
use crate::types::{Team, TeamMember};

fn load_team(s: &Session<'_>, team_id: i64) -> Result<Team> {
    s.get_team(team_id)?.ok_or(Error::TeamDoesNotExist { team_id })
}

/// `Some(is_admin)` for members of the team, `None` otherwise.
fn membership(s: &Session<'_>, auth: &Auth, team_id: i64) -> Result<Option<bool>> {
    match auth {
        Auth::User(user) => s.team_membership(team_id, user.id),
        Auth::LinkShare(_) => Ok(None),
    }
}

fn with_members(s: &Session<'_>, mut team: Team) -> Result<Team> {
    team.members = s.list_team_members(team.id)?;
    Ok(team)
}

/// Creates a team with the caller as its first admin.
pub fn create(s: &Session<'_>, auth: &Auth, team: &mut Team) -> Result<()> {
    let user = auth.require_user()?;
    if team.name.trim().is_empty() {
        return Err(Error::TeamNameCannotBeEmpty);
    }

    team.created_by_id = user.id;
    s.create_team(team)?;
    s.add_team_member(team.id, user.id, true)?;
    team.members = s.list_team_members(team.id)?;
    Ok(())
}

pub fn read_one(s: &Session<'_>, auth: &Auth, team_id: i64) -> Result<Team> {
    let team = load_team(s, team_id)?;
    require(membership(s, auth, team_id)?.is_some())?;
    with_members(s, team)
}

/// Teams the caller belongs to.
pub fn read_all(s: &Session<'_>, auth: &Auth) -> Result<Vec<Team>> {
    let user = auth.require_user()?;
    s.list_user_teams(user.id)?
        .into_iter()
        .map(|team| with_members(s, team))
        .collect()
}

pub fn delete(s: &Session<'_>, auth: &Auth, team_id: i64) -> Result<()> {
    load_team(s, team_id)?;
    require(membership(s, auth, team_id)? == Some(true))?;
    s.delete_team(team_id)?;
    Ok(())
}

/// Adds a user by username. Only team admins may change membership.
pub fn add_member(
    s: &Session<'_>,
    auth: &Auth,
    team_id: i64,
    username: &str,
    admin: bool,
) -> Result<TeamMember> {
    load_team(s, team_id)?;
    require(membership(s, auth, team_id)? == Some(true))?;

    let user = s
        .get_user_by_username(username)?
        .ok_or_else(|| Error::UserDoesNotExist {
            user: username.to_string(),
        })?;
    if s.team_membership(team_id, user.id)?.is_some() {
        return Err(Error::UserIsMemberOfTeam {
            team_id,
            user_id: user.id,
        });
    }

    let mut member = s.add_team_member(team_id, user.id, admin)?;
    member.username = user.username;
    Ok(member)
}

pub fn remove_member(s: &Session<'_>, auth: &Auth, team_id: i64, username: &str) -> Result<()> {
    load_team(s, team_id)?;
    require(membership(s, auth, team_id)? == Some(true))?;

    let user = s
        .get_user_by_username(username)?
        .ok_or_else(|| Error::UserDoesNotExist {
            user: username.to_string(),
        })?;
    if !s.remove_team_member(team_id, user.id)? {
        return Err(Error::UserDoesNotExist {
            user: username.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    #[test]
    fn test_creator_becomes_admin() {
        let fx = Fixture::new();
        let s = fx.session();
        let mut team = Team {
            name: "Movers".into(),
            ..Default::default()
        };
        create(&s, &fx.auth(&fx.bob), &mut team).unwrap();
        assert_eq!(team.members.len(), 1);
        assert!(team.members[0].admin);
        assert_eq!(team.members[0].username, "bob");

        let mut unnamed = Team::default();
        assert!(matches!(
            create(&s, &fx.auth(&fx.bob), &mut unnamed),
            Err(Error::TeamNameCannotBeEmpty)
        ));
    }

    #[test]
    fn test_membership_changes_need_team_admin() {
        let fx = Fixture::new();
        let s = fx.session();
        let mut team = Team {
            name: "Movers".into(),
            ..Default::default()
        };
        create(&s, &fx.auth(&fx.bob), &mut team).unwrap();

        let result = add_member(&s, &fx.auth(&fx.carol), team.id, "carol", true);
        assert!(matches!(result, Err(Error::Forbidden)));

        add_member(&s, &fx.auth(&fx.bob), team.id, "carol", false).unwrap();
        let result = add_member(&s, &fx.auth(&fx.bob), team.id, "carol", false);
        assert!(matches!(result, Err(Error::UserIsMemberOfTeam { .. })));

        assert_eq!(read_one(&s, &fx.auth(&fx.carol), team.id).unwrap().members.len(), 2);
        assert!(matches!(
            delete(&s, &fx.auth(&fx.carol), team.id),
            Err(Error::Forbidden)
        ));

        remove_member(&s, &fx.auth(&fx.bob), team.id, "carol").unwrap();
        assert!(matches!(
            read_one(&s, &fx.auth(&fx.carol), team.id),
            Err(Error::Forbidden)
        ));
    }

    #[test]
    fn test_read_all_lists_member_teams() {
        let fx = Fixture::new();
        let s = fx.session();
        let teams = read_all(&s, &fx.auth(&fx.carol)).unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].name, "crew");
        assert!(read_all(&s, &fx.auth(&fx.bob)).unwrap().is_empty());
    }
}
