use anyhow::{anyhow, bail, Context};
use shared::domain::{BookmarkId, OAuthProvider};
use url::Url;

pub const HELP: &str = "\
commands:
  login [provider]        open the provider sign-in page
  callback <redirect-url> finish signing in with the address you were sent back to
  add <url> <title...>    save a bookmark
  rm <id>                 delete a bookmark
  reload                  fetch the list again
  whoami                  show the signed-in user
  logout                  sign out
  help                    show this text
  quit                    leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(Option<OAuthProvider>),
    Callback(Url),
    Add { url: String, title: String },
    Remove(BookmarkId),
    Reload,
    WhoAmI,
    Logout,
    Help,
    Quit,
}

/// Parses one shell line. Blank lines yield `None`.
pub fn parse(line: &str) -> anyhow::Result<Option<Command>> {
    let line = line.trim();
    let Some(name) = line.split_whitespace().next() else {
        return Ok(None);
    };
    let rest = line[name.len()..].trim_start();

    let command = match name.to_ascii_lowercase().as_str() {
        "login" => match rest {
            "" => Command::Login(None),
            provider => Command::Login(Some(provider.parse()?)),
        },
        "callback" => {
            if rest.is_empty() {
                bail!("usage: callback <redirect-url>");
            }
            Command::Callback(
                Url::parse(rest).with_context(|| format!("'{rest}' is not a redirect address"))?,
            )
        }
        "add" => {
            let (url, title) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if url.is_empty() {
                bail!("usage: add <url> <title...>");
            }
            Command::Add {
                url: url.to_string(),
                title: title.trim().to_string(),
            }
        }
        "rm" | "delete" => {
            let id = rest
                .parse::<i64>()
                .map_err(|_| anyhow!("usage: rm <id> (the number shown next to the bookmark)"))?;
            Command::Remove(BookmarkId(id))
        }
        "reload" => Command::Reload,
        "whoami" => Command::WhoAmI,
        "logout" => Command::Logout,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command '{other}', type `help`"),
    };

    Ok(Some(command))
}

#[cfg(test)]
#[path = "tests/command_tests.rs"]
mod tests;
