//! 实验结果.

use crate::profile::Profile;
use std::io::{self, Write};

/// 将 `p` 的结果写进 `w` 中.
fn describe_into<W: Write>(name: &str, p: &Profile, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.3}"),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Profile `{name}`:")?;
    writeln!(w, "{S4}Images: {}", p.images())?;
    writeln!(w, "{S4}Average regions: {}", f64_to_display(p.avg_regions()))?;
    writeln!(
        w,
        "{S4}Average neighbours per region: {}",
        f64_to_display(p.avg_neighbours())
    )?;
    writeln!(w, "{S4}Engine total time: {} us", p.engine_time_us())?;
    writeln!(
        w,
        "{S4}Engine average time: {} us",
        f64_to_display(p.avg_engine_time_us())
    )?;
    writeln!(w, "{S4}Total machine time: {} us", p.real_time_us())?;
    let t = p.most_time_consuming().map(|d| d.as_micros().to_string());
    write!(
        w,
        "{S4}Slowest round costs {} us",
        t.as_deref().unwrap_or("/")
    )?;
    Ok(())
}

/// 消融实验最终结果.
pub struct AblationResult {
    data: Vec<(&'static str, Profile)>,
}

impl FromIterator<(&'static str, Profile)> for AblationResult {
    fn from_iter<I: IntoIterator<Item = (&'static str, Profile)>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }
}

impl AblationResult {
    /// 分析运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(512);

        for (key, profile) in self.data.iter() {
            describe_into(key, profile, &mut buf).unwrap();
            println!("{}", String::from_utf8_lossy(&buf));
            buf.clear();

            utils::sep();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::describe_into;
    use crate::profile::Profile;

    #[test]
    fn test_describe_empty_profile() {
        let mut buf = Vec::new();
        describe_into("serial", &Profile::new(), &mut buf).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.starts_with("Profile `serial`:"));
        assert!(s.contains("Average regions: /"));
        assert!(s.ends_with("Slowest round costs / us"));
    }
}
